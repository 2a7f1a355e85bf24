//! BER → XML pretty writer: a depth-first walk over a [`tlv::Cursor`]
//! that renders named, indented, optionally-annotated XML, reusing
//! `tlv::Cursor` and `grammar::Grammar` rather than introducing a
//! parallel traversal.

use crate::bcd;
use crate::error::Result;
use crate::grammar::{ContentKind, Grammar};
use crate::header;
use crate::length;
use crate::tag::{self, TagClass};
use crate::tlv::{self, Cursor};
use std::fmt::Write as _;

/// Rendering options for [`write_pretty`].
#[derive(Clone, Debug)]
pub struct Options {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Render all primitive content as hex, regardless of content kind.
    pub hex: bool,
    /// Emit `tag="n"` on every element (CLI `--tag`).
    pub show_tag: bool,
    /// Emit `klasse="..."` on every element (CLI `--klasse`).
    pub show_klasse: bool,
    /// Emit `tl="n"` (total TL header size) on every element (CLI `--tl`).
    pub show_tl: bool,
    /// Emit `t_size="..."` debug attribute (CLI `--t-size`).
    pub dump_tl: bool,
    /// Emit `length="n"` (raw decoded length field) on every element
    /// (CLI `--length`).
    pub show_length: bool,
    /// Emit `offset="..."` on every element (CLI `--offset`).
    pub offset: bool,
    /// Emit a `bcd="..."` comment alongside the decoded text of a
    /// BCD-typed primitive, showing its raw packed bytes (CLI `--bci`).
    pub bci: bool,
    /// Start the cursor at this byte offset instead of 0 (resuming at a
    /// known TLV boundary).
    pub skip_first_n_bytes: usize,
    /// Stop after emitting this many top-level subtrees (`None` = no
    /// limit).
    pub count: Option<usize>,
    /// Stop after the first emitted subtree (used with search).
    pub first_only: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: 2,
            hex: false,
            show_tag: false,
            show_klasse: false,
            show_tl: false,
            dump_tl: false,
            show_length: false,
            offset: false,
            bci: false,
            skip_first_n_bytes: 0,
            count: None,
            first_only: false,
        }
    }
}

/// Render `input` as indented XML into `out`, per `opts`.
pub fn write_pretty(input: &[u8], grammar: &Grammar, opts: &Options, out: &mut String) -> Result<()> {
    let mut cursor = Cursor::at_offset(input, opts.skip_first_n_bytes);
    let mut emitted_at_root = 0usize;
    let mut root_depth_seen: Option<usize> = None;

    while cursor.advance()? {
        let header = *cursor.header().unwrap();
        if tlv::is_eoc(&header) {
            continue;
        }
        let depth = cursor.depth();

        if root_depth_seen.is_none() {
            root_depth_seen = Some(depth);
        }
        if depth == root_depth_seen.unwrap() {
            if let Some(limit) = opts.count {
                if emitted_at_root == limit {
                    break;
                }
            }
            emitted_at_root += 1;
            if opts.first_only && emitted_at_root > 1 {
                break;
            }
        }

        let indent = " ".repeat(depth * opts.indent);
        let name = element_name(&header, grammar);

        if header.constructed {
            write!(out, "{indent}<{name}").unwrap();
            write_common_attrs(&header, &cursor, opts, out);
            if header.is_indefinite() {
                write!(out, " definite=\"false\"").unwrap();
            }
            out.push_str(">\n");
        } else {
            let kind = grammar.content_typer.classify(header.class, header.tag);
            let value = cursor.value().unwrap_or(&[]);
            let text = render_text(kind, value, opts.hex);
            write!(out, "{indent}<{name}").unwrap();
            write_common_attrs(&header, &cursor, opts, out);
            write!(out, ">{text}</{name}>").unwrap();
            if opts.bci && matches!(kind, ContentKind::BcdString) {
                write!(out, "<!-- bcd={} -->", hex(value)).unwrap();
            }
            out.push('\n');
        }
    }
    Ok(())
}

fn element_name(header: &header::Header, grammar: &Grammar) -> String {
    match grammar.tag_translator.lookup(header.class, header.tag) {
        Some(name) => name.to_string(),
        None => format!(
            "Unknown class=\"{}\" tag=\"{}\"",
            header.class, header.tag
        ),
    }
}

fn write_common_attrs(header: &header::Header, cursor: &Cursor, opts: &Options, out: &mut String) {
    if let Ok(id_size) = tag::identifier_len(header.tag) {
        let len_size = header.tl_size as usize - id_size;
        if !header.is_indefinite() {
            if let Ok(minimal) = length::length_len(header.length, 0) {
                if len_size > minimal {
                    // `l_size` round-trips through `write_tl`'s
                    // `forced_len_width`, which counts long-form content
                    // bytes only, not the leading `0x80|width` byte.
                    write!(out, " l_size=\"{}\"", len_size - 1).unwrap();
                }
            }
        }
    }
    if opts.show_tag {
        write!(out, " tag=\"{}\"", header.tag).unwrap();
    }
    if opts.show_klasse {
        write!(out, " klasse=\"{}\"", header.class).unwrap();
    }
    if opts.show_tl {
        write!(out, " tl=\"{}\"", header.tl_size).unwrap();
    }
    if opts.show_length && !header.is_indefinite() {
        write!(out, " length=\"{}\"", header.length).unwrap();
    }
    if opts.offset {
        write!(out, " offset=\"{}\"", cursor.offset()).unwrap();
    }
    if opts.dump_tl {
        write!(out, " t_size=\"{}\"", header.tl_size).unwrap();
    }
}

fn render_text(kind: ContentKind, bytes: &[u8], force_hex: bool) -> String {
    if force_hex || matches!(kind, ContentKind::Raw) {
        return hex(bytes);
    }
    match kind {
        ContentKind::BcdString => bcd::decode(bytes),
        ContentKind::Ia5String => String::from_utf8_lossy(bytes).into_owned(),
        ContentKind::IntegerUnsigned => {
            let mut v: u64 = 0;
            for &b in bytes {
                v = (v << 8) | b as u64;
            }
            v.to_string()
        }
        ContentKind::IntegerSigned => {
            let mut v: i64 = if bytes.first().map_or(false, |&b| b & 0x80 != 0) {
                -1
            } else {
                0
            };
            for &b in bytes {
                v = (v << 8) | b as i64;
            }
            v.to_string()
        }
        ContentKind::Timestamp => timestamp(bytes),
        ContentKind::OctetString | ContentKind::BitString | ContentKind::Raw => hex(bytes),
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{:02x}", b).unwrap();
    }
    s
}

/// `yyyyMMddHHmmss`, optionally followed by a 5-byte ASCII UTC offset
/// (e.g. `-0500`).
fn timestamp(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{ContentTyper, NameTranslator, TagTranslator};
    use crate::header::write_tl;
    use std::collections::HashMap;

    fn grammar_with(names: &[((TagClass, u32), &str)]) -> Grammar {
        let mut map = HashMap::new();
        for &(k, v) in names {
            map.insert(k, v.to_string());
        }
        Grammar::new(
            NameTranslator::new(),
            TagTranslator::new(map),
            ContentTyper::new().with_default(ContentKind::Raw),
        )
    }

    #[test]
    fn renders_named_constructed_and_primitive() {
        let mut inner = write_tl(TagClass::Context, 1, false, 1, 0).unwrap();
        inner.push(0xab);
        let mut out_bytes =
            write_tl(TagClass::Application, 1, true, inner.len() as u32, 0).unwrap();
        out_bytes.extend(inner);

        let grammar = grammar_with(&[
            ((TagClass::Application, 1), "TransferBatch"),
            ((TagClass::Context, 1), "Field"),
        ]);
        let mut xml = String::new();
        write_pretty(&out_bytes, &grammar, &Options::default(), &mut xml).unwrap();
        assert!(xml.contains("<TransferBatch>"));
        assert!(xml.contains("<Field>ab</Field>"));
    }

    #[test]
    fn unknown_tag_renders_as_unknown() {
        let bytes = write_tl(TagClass::Application, 99, false, 0, 0).unwrap();
        let grammar = grammar_with(&[]);
        let mut xml = String::new();
        write_pretty(&bytes, &grammar, &Options::default(), &mut xml).unwrap();
        assert!(xml.contains("Unknown class=\"APPLICATION\" tag=\"99\""));
    }

    #[test]
    fn indefinite_constructed_gets_definite_false() {
        let mut out_bytes =
            write_tl(TagClass::Universal, 16, true, length::INDEFINITE, 0).unwrap();
        let mut inner = write_tl(TagClass::Context, 1, false, 0, 0).unwrap();
        out_bytes.append(&mut inner);
        out_bytes.extend([0x00, 0x00]);

        let grammar = grammar_with(&[((TagClass::Universal, 16), "Seq")]);
        let mut xml = String::new();
        write_pretty(&out_bytes, &grammar, &Options::default(), &mut xml).unwrap();
        assert!(xml.contains("definite=\"false\""));
    }
}

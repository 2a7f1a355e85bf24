//! XML → BER writer: a two-pass traversal over a parsed XML DOM tree
//! that produces bit-exact BER when `definite` and `l_size` are
//! preserved from a prior pretty-print.
//!
//! The two passes — sizing (post-order) then emission (pre-order) — fall
//! out of a single bottom-up recursion: each element's encoded bytes are
//! built from its already-encoded children, so a constructed element's
//! length is known (it's just the sum of its children's encoded lengths)
//! before its own TL header is written, and the final byte order is
//! depth-first pre-order because the header is always prepended to the
//! children's bytes, never appended.

use crate::bcd;
use crate::error::{ErrorKind, Result};
use crate::grammar::{ContentKind, Grammar, Shape};
use crate::header;
use crate::length::INDEFINITE;
use crate::xml::dom::{Document, Node};

/// Build BER bytes from a parsed XML document.
pub fn write_ber(doc: &Document, grammar: &Grammar) -> Result<Vec<u8>> {
    let root = doc.document_element().ok_or(ErrorKind::Malformed)?;
    encode_element(doc, root, grammar)
}

fn encode_element(doc: &Document, node: Node, grammar: &Grammar) -> Result<Vec<u8>> {
    let name = doc.element_name(node.clone()).ok_or(ErrorKind::Malformed)?;
    let (shape, class, tag) = grammar
        .name_translator
        .translate(&name)
        .ok_or(ErrorKind::UnknownTag)?;
    let constructed = matches!(shape, Shape::Constructed);

    let indefinite = doc.get_attribute(&node, "definite").as_deref() == Some("false");
    let forced_len_width: u8 = doc
        .get_attribute(&node, "l_size")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let body = if constructed {
        let mut children_bytes = Vec::new();
        let mut child = doc.first_child_element(node.clone());
        while let Some(c) = child {
            children_bytes.extend(encode_element(doc, c.clone(), grammar)?);
            child = doc.next_sibling_element(c);
        }
        if indefinite {
            children_bytes.extend([0x00, 0x00]); // EOC
        }
        children_bytes
    } else {
        let uint2int = doc.get_attribute(&node, "uint2int").as_deref() == Some("true");
        let kind = grammar.content_typer.classify(class, tag);
        let text = doc.text_content(node);
        encode_primitive(kind, &text, uint2int)?
    };

    let length = if indefinite {
        INDEFINITE
    } else {
        body.len() as u32
    };
    let mut out = header::write_tl(class, tag, constructed, length, forced_len_width)?;
    out.extend(body);
    Ok(out)
}

/// Encode a primitive element's text content into body bytes, inverting
/// the pretty writer's rendering for each content kind.
fn encode_primitive(kind: ContentKind, text: &str, uint2int: bool) -> Result<Vec<u8>> {
    match kind {
        ContentKind::BcdString => bcd::encode(text, true),
        ContentKind::Ia5String => Ok(text.as_bytes().to_vec()),
        ContentKind::Timestamp => Ok(text.as_bytes().to_vec()),
        ContentKind::IntegerUnsigned => {
            let v: u64 = text.trim().parse().map_err(|_| ErrorKind::InvalidDigit)?;
            Ok(minimal_be_bytes(v))
        }
        ContentKind::IntegerSigned => {
            let v: i64 = text.trim().parse().map_err(|_| ErrorKind::InvalidDigit)?;
            if uint2int {
                // The field was produced with an unsigned minimal-width
                // encoding even though its value is meant to be signed
                // (e.g. a negative count emitted as a huge positive
                // number); fall back to the unsigned width rule instead
                // of picking a new signed width, so the byte count
                // matches what the original writer emitted.
                Ok(minimal_be_bytes(v as u64))
            } else {
                Ok(minimal_twos_complement(v))
            }
        }
        ContentKind::OctetString | ContentKind::BitString | ContentKind::Raw => hex_decode(text),
    }
}

fn minimal_be_bytes(v: u64) -> Vec<u8> {
    if v == 0 {
        return vec![0];
    }
    let bytes = v.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap();
    bytes[first_nonzero..].to_vec()
}

fn minimal_twos_complement(v: i64) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let b = bytes[start];
        let next_sign_bit = bytes[start + 1] & 0x80;
        let redundant = (b == 0x00 && next_sign_bit == 0) || (b == 0xff && next_sign_bit != 0);
        if redundant {
            start += 1;
        } else {
            break;
        }
    }
    bytes[start..].to_vec()
}

fn hex_decode(text: &str) -> Result<Vec<u8>> {
    let t = text.trim();
    if t.len() % 2 != 0 {
        return Err(ErrorKind::InvalidDigit.into());
    }
    let mut out = Vec::with_capacity(t.len() / 2);
    let bytes = t.as_bytes();
    for chunk in bytes.chunks_exact(2) {
        let hi = (chunk[0] as char).to_digit(16).ok_or(ErrorKind::InvalidDigit)?;
        let lo = (chunk[1] as char).to_digit(16).ok_or(ErrorKind::InvalidDigit)?;
        out.push(((hi << 4) | lo) as u8);
    }
    Ok(out)
}

//! A small, backend-agnostic depth-first traversal interface, ported from
//! `xfsx/traverser/lxml.hh`'s `LXML_Proxy`. Consumers that only need to
//! walk a tree and read a handful of scalar fields off each node (the
//! tag-path searcher, the ACI computation, the pretty writer) are written
//! once against [`Proxy`]; [`TlvProxy`] and [`DomProxy`] are the two
//! concrete backends, over a [`tlv::Cursor`] and over an XML DOM tree
//! respectively.
//!
//! The original's proxy is parametrized over a single backend type
//! (`xxxml::util::DF_Traverser`) selected at compile time per call site.
//! Here that becomes a trait, so the same generic algorithm can run over
//! either backend without duplicating it.

use crate::bcd;
use crate::error::{ErrorKind, Result};
use crate::grammar::{ContentKind, Grammar};
use crate::tag::TagClass;
use crate::tlv::Cursor;
use crate::xml::dom::{Document, Node};

/// A depth-first, forward-only view of a tree, abstracting over whatever
/// actually stores the nodes.
pub trait Proxy {
    /// The `(class, tag)` of the current node, translated through a
    /// grammar where the backend doesn't carry it natively (e.g. an XML
    /// element named by tag name rather than by numeric tag).
    fn tag(&self) -> Result<(TagClass, u32)>;
    /// Nesting depth of the current node; the root is 0.
    fn height(&self) -> u32;
    /// The node's primitive content, rendered as text.
    fn string(&self) -> Result<String>;
    /// The node's primitive content, parsed as an unsigned 32-bit integer.
    fn uint32(&self) -> Result<u32> {
        parse_uint(&self.string()?).map(|v| v as u32)
    }
    /// The node's primitive content, parsed as an unsigned 64-bit integer.
    fn uint64(&self) -> Result<u64> {
        parse_uint(&self.string()?)
    }
    /// Move to the next node in document order, descending into children
    /// first (same contract as [`tlv::Cursor::advance`]).
    fn advance(&mut self) -> Result<()>;
    /// Move past the current node's subtree without descending into it.
    fn skip_children(&mut self) -> Result<()>;
    /// Has the traversal reached the end?
    fn eot(&self) -> bool;
}

fn parse_uint(s: &str) -> Result<u64> {
    s.trim().parse::<u64>().map_err(|_| ErrorKind::InvalidDigit.into())
}

/// Render a primitive's raw content octets as text, the way the pretty
/// writer would for the same content kind.
fn render_primitive(kind: ContentKind, bytes: &[u8]) -> String {
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
        ContentKind::OctetString | ContentKind::BitString | ContentKind::Raw => {
            bytes.iter().map(|b| format!("{:02x}", b)).collect()
        }
        ContentKind::Timestamp => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// A [`Proxy`] over a raw BER byte window, via a [`tlv::Cursor`].
pub struct TlvProxy<'a> {
    cursor: Cursor<'a>,
    grammar: Grammar,
}

impl<'a> TlvProxy<'a> {
    /// Build a proxy positioned before the first node; the caller must
    /// call `advance` once before reading any field, matching
    /// `tlv::Cursor`'s own contract.
    pub fn new(input: &'a [u8], grammar: Grammar) -> Self {
        TlvProxy {
            cursor: Cursor::new(input),
            grammar,
        }
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }
}

impl Proxy for TlvProxy<'_> {
    fn tag(&self) -> Result<(TagClass, u32)> {
        let header = self.cursor.header().ok_or(ErrorKind::Malformed)?;
        Ok((header.class, header.tag))
    }

    fn height(&self) -> u32 {
        self.cursor.depth() as u32
    }

    fn string(&self) -> Result<String> {
        let header = self.cursor.header().ok_or(ErrorKind::Malformed)?;
        let bytes = self.cursor.value().ok_or(ErrorKind::Malformed)?;
        let kind = self.grammar.content_typer.classify(header.class, header.tag);
        Ok(render_primitive(kind, bytes))
    }

    fn advance(&mut self) -> Result<()> {
        self.cursor.advance()?;
        Ok(())
    }

    fn skip_children(&mut self) -> Result<()> {
        self.cursor.skip_children()
    }

    fn eot(&self) -> bool {
        self.cursor.eot()
    }
}

/// A [`Proxy`] over a parsed XML DOM tree, walking elements depth-first
/// in document order.
pub struct DomProxy<'a> {
    doc: &'a Document,
    stack: Vec<Node>,
    current: Option<Node>,
    /// True until the first `advance()`, which only arrives at the root
    /// `current` already points to rather than moving past it.
    before_start: bool,
    /// Set by `skip_children`; consumed by the next `advance()` to
    /// suppress descending into the current node's children.
    skip_descent: bool,
    grammar: Grammar,
}

impl<'a> DomProxy<'a> {
    pub fn new(doc: &'a Document, root: Node, grammar: Grammar) -> Self {
        DomProxy {
            doc,
            stack: Vec::new(),
            current: Some(root),
            before_start: true,
            skip_descent: false,
            grammar,
        }
    }
}

impl Proxy for DomProxy<'_> {
    fn tag(&self) -> Result<(TagClass, u32)> {
        let node = self.current.clone().ok_or(ErrorKind::Malformed)?;
        let name = self.doc.element_name(node).ok_or(ErrorKind::Malformed)?;
        let (_, class, tag) = self
            .grammar
            .name_translator
            .translate(&name)
            .ok_or(ErrorKind::UnknownTag)?;
        Ok((class, tag))
    }

    fn height(&self) -> u32 {
        self.stack.len() as u32
    }

    fn string(&self) -> Result<String> {
        let node = self.current.clone().ok_or(ErrorKind::Malformed)?;
        Ok(self.doc.text_content(node))
    }

    fn advance(&mut self) -> Result<()> {
        if self.before_start {
            self.before_start = false;
            return Ok(());
        }
        let node = self.current.clone().ok_or(ErrorKind::Malformed)?;
        if !self.skip_descent {
            if let Some(first_child) = self.doc.first_child_element(node.clone()) {
                self.stack.push(node);
                self.current = Some(first_child);
                return Ok(());
            }
        }
        self.skip_descent = false;
        let mut from = node;
        loop {
            if let Some(sibling) = self.doc.next_sibling_element(from.clone()) {
                self.current = Some(sibling);
                return Ok(());
            }
            match self.stack.pop() {
                Some(parent) => from = parent,
                None => {
                    self.current = None;
                    return Ok(());
                }
            }
        }
    }

    fn skip_children(&mut self) -> Result<()> {
        self.skip_descent = true;
        Ok(())
    }

    fn eot(&self) -> bool {
        self.current.is_none()
    }
}

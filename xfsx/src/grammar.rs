//! The grammar overlay: `(class, tag) <-> name` translation and
//! primitive content typing.
//!
//! Consumed read-only after a one-time construction from a pre-built
//! grammar object (ASN.1 source parsing is an external collaborator).
//! `TagTranslator` is modeled as a small immutable linked overlay rather
//! than a mutable stack with manual pop-on-error-path bookkeeping, so a
//! recursive traversal can hand an enriched translator down by value.

use crate::tag::TagClass;
use std::collections::HashMap;
use std::rc::Rc;

/// How a primitive's bytes are rendered in / parsed from XML text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContentKind {
    IntegerSigned,
    IntegerUnsigned,
    OctetString,
    BcdString,
    Ia5String,
    BitString,
    Timestamp,
    Raw,
}

/// Whether `(class, tag)` defaults to a primitive or constructed shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Shape {
    Primitive,
    Constructed,
}

/// `name -> (shape, class, tag)`, built once from the compiled grammar.
#[derive(Debug, Default)]
pub struct NameTranslator {
    by_name: HashMap<String, (Shape, TagClass, u32)>,
}

impl NameTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, shape: Shape, class: TagClass, tag: u32) {
        self.by_name.insert(name.into(), (shape, class, tag));
    }

    pub fn translate(&self, name: &str) -> Option<(Shape, TagClass, u32)> {
        self.by_name.get(name).copied()
    }
}

/// `(class, tag) -> name`, stack-scoped so a subtree (e.g. a
/// `RapAuditControlInfo` under a TAP-grammared document) can push a local
/// translation that shadows the outer one for its own depth and
/// everything below it.
///
/// Implemented as a linked list of immutable layers: pushing returns a
/// new `TagTranslator` sharing the parent layer by `Rc`, so a recursive
/// traversal passes the enriched translator down by value with no pop
/// required on any exit path, including early returns on error.
#[derive(Clone)]
pub struct TagTranslator {
    layer: Rc<HashMap<(TagClass, u32), String>>,
    parent: Option<Rc<TagTranslator>>,
}

impl TagTranslator {
    /// Build the root (outermost) translator from a complete mapping.
    pub fn new(map: HashMap<(TagClass, u32), String>) -> Self {
        TagTranslator {
            layer: Rc::new(map),
            parent: None,
        }
    }

    /// Push a local overlay that shadows `self` for `(class, tag)` pairs
    /// it redefines; lookups that miss fall through to `self`.
    pub fn push(&self, overlay: HashMap<(TagClass, u32), String>) -> TagTranslator {
        TagTranslator {
            layer: Rc::new(overlay),
            parent: Some(Rc::new(self.clone())),
        }
    }

    pub fn lookup(&self, class: TagClass, tag: u32) -> Option<&str> {
        if let Some(name) = self.layer.get(&(class, tag)) {
            return Some(name.as_str());
        }
        self.parent.as_ref().and_then(|p| p.lookup(class, tag))
    }
}

/// `(class, tag) -> content kind`, used to pick a primitive's rendering.
#[derive(Debug, Default)]
pub struct ContentTyper {
    by_tag: HashMap<(TagClass, u32), ContentKind>,
    /// Fallback used when no explicit mapping exists.
    default_kind: Option<ContentKind>,
}

impl ContentTyper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, kind: ContentKind) -> Self {
        self.default_kind = Some(kind);
        self
    }

    pub fn insert(&mut self, class: TagClass, tag: u32, kind: ContentKind) {
        self.by_tag.insert((class, tag), kind);
    }

    pub fn classify(&self, class: TagClass, tag: u32) -> ContentKind {
        self.by_tag
            .get(&(class, tag))
            .copied()
            .or(self.default_kind)
            .unwrap_or(ContentKind::Raw)
    }
}

/// The read-only bundle handed to the pretty writer / XML builder.
#[derive(Clone)]
pub struct Grammar {
    pub name_translator: Rc<NameTranslator>,
    pub tag_translator: TagTranslator,
    pub content_typer: Rc<ContentTyper>,
}

impl Grammar {
    pub fn new(
        name_translator: NameTranslator,
        tag_translator: TagTranslator,
        content_typer: ContentTyper,
    ) -> Self {
        Grammar {
            name_translator: Rc::new(name_translator),
            tag_translator,
            content_typer: Rc::new(content_typer),
        }
    }

    /// Return a copy of this grammar with a local `(class, tag) -> name`
    /// overlay pushed, for entering a subtree that locally remaps
    /// APPLICATION tags, as a TAP/RAP batch does for its record subtrees.
    pub fn with_overlay(&self, overlay: HashMap<(TagClass, u32), String>) -> Self {
        Grammar {
            name_translator: self.name_translator.clone(),
            tag_translator: self.tag_translator.push(overlay),
            content_typer: self.content_typer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_shadows_then_falls_through() {
        let mut base = HashMap::new();
        base.insert((TagClass::Application, 1), "Outer".to_string());
        base.insert((TagClass::Application, 2), "Shared".to_string());
        let root = TagTranslator::new(base);

        let mut overlay = HashMap::new();
        overlay.insert((TagClass::Application, 1), "Inner".to_string());
        let scoped = root.push(overlay);

        assert_eq!(scoped.lookup(TagClass::Application, 1), Some("Inner"));
        assert_eq!(scoped.lookup(TagClass::Application, 2), Some("Shared"));
        assert_eq!(root.lookup(TagClass::Application, 1), Some("Outer"));
    }

    #[test]
    fn content_typer_falls_back_to_default() {
        let typer = ContentTyper::new().with_default(ContentKind::Raw);
        assert_eq!(
            typer.classify(TagClass::Context, 99),
            ContentKind::Raw
        );
    }
}

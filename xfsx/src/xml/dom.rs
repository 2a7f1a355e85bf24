//! A thin adapter over the `xml_dom` crate's level-2 DOM, narrowing its
//! general-purpose `Node`/`Document`/`Element` traits down to the handful
//! of operations the pretty writer, the XML→BER builder and the edit
//! pipeline actually need. A full XML DOM is an external collaborator
//! here, not something this crate implements itself.
//!
//! Every call into `xml_dom` is funneled through this module, so the rest
//! of the crate never names `RefNode` or the `level2` traits directly.

use crate::error::{Error, ErrorKind, Result};
use xml_dom::level2::{
    get_implementation, Document as DomDocument, Element as DomElement, Node as DomNode,
    NodeType, RefNode,
};

/// A parsed or freshly-built XML document.
pub struct Document {
    root: RefNode,
}

/// A handle to a single DOM element, cheap to copy (it's a reference into
/// the owning [`Document`]'s tree).
#[derive(Clone)]
pub struct Node(pub(crate) RefNode);

impl Document {
    /// Parse `xml` into a document.
    pub fn parse(xml: &str) -> Result<Self> {
        let root =
            xml_dom::parser::read_xml(xml).map_err(|_| Error::from(ErrorKind::Xml))?;
        Ok(Document { root })
    }

    /// Start a fresh, empty document.
    pub fn new() -> Result<Self> {
        let implementation = get_implementation();
        let root = implementation
            .create_document(None, None, None)
            .map_err(|_| Error::from(ErrorKind::Xml))?;
        Ok(Document { root })
    }

    /// The document's root element, if one has been set.
    pub fn document_element(&self) -> Option<Node> {
        let doc = DomDocument::document_element(&self.root)?;
        Some(Node(doc))
    }

    /// Create a detached element named `name`; the caller is responsible
    /// for appending it somewhere in the tree.
    pub fn create_element(&mut self, name: &str) -> Result<Node> {
        let node = DomDocument::create_element(&mut self.root, name)
            .map_err(|_| Error::from(ErrorKind::Xml))?;
        Ok(Node(node))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> Result<Node> {
        let node = DomDocument::create_text_node(&mut self.root, text);
        Ok(Node(node))
    }

    /// Append `child` as the last child of `parent` (or of the document
    /// itself when `parent` is `None`).
    pub fn append_child(&mut self, parent: Option<&Node>, child: Node) -> Result<()> {
        let mut target = match parent {
            Some(p) => p.0.clone(),
            None => self.root.clone(),
        };
        DomNode::append_child(&mut target, child.0)
            .map_err(|_| Error::from(ErrorKind::Xml))?;
        Ok(())
    }

    /// Insert `child` as a new element child of `parent`, before the
    /// existing element child currently at `index` (0 = first); an index
    /// at or past the current element-child count appends at the end.
    pub fn insert_child_at(&mut self, parent: &Node, index: usize, child: Node) -> Result<()> {
        let existing: Vec<RefNode> = DomNode::child_nodes(&parent.0)
            .into_iter()
            .filter(|c| DomNode::node_type(c) == NodeType::Element)
            .collect();
        let mut target = parent.0.clone();
        match existing.get(index) {
            Some(before) => {
                DomNode::insert_before(&mut target, child.0, Some(before.clone()))
                    .map_err(|_| Error::from(ErrorKind::Xml))?;
            }
            None => {
                DomNode::append_child(&mut target, child.0)
                    .map_err(|_| Error::from(ErrorKind::Xml))?;
            }
        }
        Ok(())
    }

    /// Number of element children `node` has.
    pub fn child_element_count(&self, node: &Node) -> usize {
        DomNode::child_nodes(&node.0)
            .into_iter()
            .filter(|c| DomNode::node_type(c) == NodeType::Element)
            .count()
    }

    /// Remove every direct text-node child of `node`, leaving any element
    /// children untouched.
    pub fn clear_text(&mut self, node: &Node) -> Result<()> {
        let text_children: Vec<RefNode> = DomNode::child_nodes(&node.0)
            .into_iter()
            .filter(|c| DomNode::node_type(c) == NodeType::Text)
            .collect();
        let mut target = node.0.clone();
        for t in text_children {
            DomNode::remove_child(&mut target, t).map_err(|_| Error::from(ErrorKind::Xml))?;
        }
        Ok(())
    }

    /// An element's tag name.
    pub fn element_name(&self, node: Node) -> Option<String> {
        if DomNode::node_type(&node.0) != NodeType::Element {
            return None;
        }
        Some(DomNode::node_name(&node.0).to_string())
    }

    /// An element's concatenated direct text-node content.
    pub fn text_content(&self, node: Node) -> String {
        DomNode::child_nodes(&node.0)
            .iter()
            .filter(|c| DomNode::node_type(c) == NodeType::Text)
            .map(|c| DomNode::node_value(c).unwrap_or_default())
            .collect()
    }

    /// Set an attribute's value, creating it if absent.
    pub fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        let mut n = node.0.clone();
        DomElement::set_attribute(&mut n, name, value);
        Ok(())
    }

    /// Read an attribute's value, if present.
    pub fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
        DomElement::get_attribute(&node.0, name)
    }

    /// The first element child, skipping text/comment nodes.
    pub fn first_child_element(&self, node: Node) -> Option<Node> {
        DomNode::child_nodes(&node.0)
            .into_iter()
            .find(|c| DomNode::node_type(c) == NodeType::Element)
            .map(Node)
    }

    /// The next sibling element, skipping text/comment nodes.
    pub fn next_sibling_element(&self, node: Node) -> Option<Node> {
        let mut cur = DomNode::next_sibling(&node.0);
        while let Some(sib) = &cur {
            if DomNode::node_type(sib) == NodeType::Element {
                return Some(Node(sib.clone()));
            }
            cur = DomNode::next_sibling(sib);
        }
        None
    }

    /// The parent element, if any (the document node itself has none).
    pub fn parent_element(&self, node: Node) -> Option<Node> {
        let parent = DomNode::parent_node(&node.0)?;
        if DomNode::node_type(&parent) == NodeType::Element {
            Some(Node(parent))
        } else {
            None
        }
    }

    /// Detach `node` from its parent.
    pub fn remove(&self, node: Node) -> Result<()> {
        let parent = DomNode::parent_node(&node.0).ok_or(ErrorKind::InvalidArgument)?;
        let mut parent = parent;
        DomNode::remove_child(&mut parent, node.0)
            .map_err(|_| Error::from(ErrorKind::Xml))?;
        Ok(())
    }

    /// Render the document to UTF-8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.root.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_single_element_document() {
        let mut doc = Document::new().unwrap();
        let root = doc.create_element("TransferBatch").unwrap();
        doc.append_child(None, root.clone()).unwrap();
        doc.set_attribute(&root, "definite", "true").unwrap();
        assert_eq!(
            doc.get_attribute(&root, "definite"),
            Some("true".to_string())
        );
    }

    #[test]
    fn parses_and_walks_children() {
        let doc = Document::parse("<a><b>1</b><c>2</c></a>").unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.element_name(root.clone()), Some("a".to_string()));
        let b = doc.first_child_element(root).unwrap();
        assert_eq!(doc.element_name(b.clone()), Some("b".to_string()));
        assert_eq!(doc.text_content(b.clone()), "1");
        let c = doc.next_sibling_element(b).unwrap();
        assert_eq!(doc.element_name(c), Some("c".to_string()));
    }
}

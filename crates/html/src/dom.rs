//! Arena-backed document tree.
//!
//! Nodes live in one `Vec`; parents own their children structurally, but all
//! cross-references (children, parent back-reference) are plain indices into
//! the arena. The root is always an `html` element at index 0 — the tree
//! builder guarantees this by synthesizing implicit wrapper tags.

pub type NodeId = usize;

#[derive(Debug)]
pub enum Node {
    Element {
        tag: String,
        /// Lower-cased names; boolean attributes carry an empty value.
        attributes: Vec<(String, String)>,
        children: Vec<NodeId>,
        parent: Option<NodeId>,
    },
    Text {
        text: String,
        parent: Option<NodeId>,
    },
}

#[derive(Debug, Default)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub(crate) fn new() -> Dom {
        Dom { nodes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `html` element. Call only on a finished tree.
    pub fn root(&self) -> NodeId {
        debug_assert!(matches!(
            self.nodes.first(),
            Some(Node::Element { tag, .. }) if tag == "html"
        ));
        0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id] {
            Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id] {
            Node::Element { parent, .. } | Node::Text { parent, .. } => *parent,
        }
    }

    /// Element tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id] {
            Node::Element { tag, .. } => Some(tag),
            Node::Text { .. } => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id] {
            Node::Text { text, .. } => Some(text),
            Node::Element { .. } => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id] {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Node::Text { .. } => None,
        }
    }

    pub(crate) fn push_element(
        &mut self,
        tag: String,
        attributes: Vec<(String, String)>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::Element {
            tag,
            attributes,
            children: Vec::new(),
            parent,
        });
        if let Some(parent) = parent {
            self.attach(parent, id);
        }
        id
    }

    pub(crate) fn push_text(&mut self, text: String, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::Text {
            text,
            parent: Some(parent),
        });
        self.attach(parent, id);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        match &mut self.nodes[parent] {
            Node::Element { children, .. } => children.push(child),
            Node::Text { .. } => unreachable!("text nodes cannot have children"),
        }
    }
}

/// Tags that belong in `<head>`; seeing one while only `<html>` is open
/// triggers an implicit `<head>`.
pub fn is_head_tag(tag: &str) -> bool {
    matches!(
        tag,
        "base" | "basefont" | "bgsound" | "noscript" | "link" | "meta" | "title" | "style"
            | "script"
    )
}

/// Void elements: appended without ever being pushed on the open stack.
pub fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

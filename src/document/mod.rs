//! Document trees: the navigable shape of a configuration document.
//!
//! Indexers and the schema engine never look at raw text. They consume a
//! [`DocumentTree`]: typed nodes with parent/child navigation, an optional
//! key (mapping key, XML element or attribute name) and literal text.
//!
//! [`DocTree`] is the arena implementation used throughout the crate. It is
//! built from XML with quick-xml ([`xml::parse`]) or from YAML with
//! serde_yaml ([`yaml::parse`]). Hosts that already own a parse tree can
//! implement [`DocumentTree`] on top of it instead.

mod source_root;
pub mod xml;
pub mod yaml;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use source_root::SourceRoot;

/// Errors raised while turning document text into a tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unbalanced element </{0}>")]
    Unbalanced(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Index of a node inside one [`DocTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Keyed children (YAML mapping, XML element with attributes/children).
    Mapping,
    /// Unkeyed, ordered children.
    Sequence,
    /// Leaf carrying text.
    Scalar,
}

/// Read-only navigation over a parsed document.
pub trait DocumentTree {
    /// Canonical path of the file the tree was parsed from.
    fn path(&self) -> &str;

    fn root(&self) -> Option<NodeId>;

    fn kind(&self, node: NodeId) -> NodeKind;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Mapping key, element name or attribute name of the node.
    fn key(&self, node: NodeId) -> Option<&str>;

    /// Literal text of a scalar, or the text content of an XML element.
    fn text(&self, node: NodeId) -> Option<&str>;

    /// First child with the given key.
    fn child(&self, node: NodeId, key: &str) -> Option<NodeId> {
        self.children(node).iter().copied().find(|&c| self.key(c) == Some(key))
    }

    /// All children with the given key (repeated XML elements).
    fn children_named(&self, node: NodeId, key: &str) -> Vec<NodeId> {
        self.children(node).iter().copied().filter(|&c| self.key(c) == Some(key)).collect()
    }

    fn child_text(&self, node: NodeId, key: &str) -> Option<&str> {
        self.child(node, key).and_then(|c| self.text(c))
    }

    /// Follow a chain of keys from the root.
    fn node_at(&self, keys: &[&str]) -> Option<NodeId> {
        keys.iter().try_fold(self.root()?, |node, key| self.child(node, key))
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    key: Option<Arc<str>>,
    text: Option<Arc<str>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed [`DocumentTree`].
#[derive(Clone, Debug)]
pub struct DocTree {
    path: Arc<str>,
    nodes: Vec<NodeData>,
}

impl DocTree {
    /// Create an empty tree for the document at `path`.
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self { path: path.into(), nodes: Vec::new() }
    }

    /// Append a node. The first node added without a parent becomes the root.
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        key: Option<&str>,
        text: Option<&str>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            key: key.map(Arc::from),
            text: text.map(Arc::from),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.idx()].children.push(id);
        }
        id
    }

    pub(crate) fn set_kind(&mut self, node: NodeId, kind: NodeKind) {
        self.nodes[node.idx()].kind = kind;
    }

    pub(crate) fn append_text(&mut self, node: NodeId, text: &str) {
        let data = &mut self.nodes[node.idx()];
        data.text = Some(match data.text.take() {
            Some(existing) => Arc::from(format!("{existing}{text}")),
            None => Arc::from(text),
        });
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in creation (document) order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

impl DocumentTree for DocTree {
    fn path(&self) -> &str {
        &self.path
    }

    fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() { None } else { Some(NodeId(0)) }
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.idx()].kind
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.idx()].parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.idx()].children
    }

    fn key(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.idx()].key.as_deref()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.idx()].text.as_deref()
    }
}

/// Supported configuration document formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Xml,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        match Path::new(path).extension()?.to_str()? {
            "xml" => Some(Self::Xml),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse document text into a tree, choosing the format by extension.
pub fn parse_document(path: &str, text: &str) -> Result<DocTree, DocumentError> {
    match DocumentFormat::from_path(path) {
        Some(DocumentFormat::Xml) => xml::parse(path, text),
        Some(DocumentFormat::Yaml) => yaml::parse(path, text),
        None => Err(DocumentError::UnsupportedFormat(path.to_string())),
    }
}

//! Declarative document schemas.
//!
//! A schema describes the shape a configuration document is expected to
//! have and, at its leaves, what the text found there *means*: a class name,
//! a method of some class, a service id, a file path. The reference engine
//! walks a schema with a [`Visitor`] and attaches resolvers to every scalar
//! position; nothing in here ever touches a document.
//!
//! ```text
//! Element
//!   ├─ Scalar(purpose)          leaf: what the text refers to
//!   ├─ Container
//!   │    ├─ Map(properties)     keyed children, exact or wildcard names
//!   │    └─ Sequence(item)      unkeyed children
//!   └─ OneOf(alternatives)      every alternative is visited
//! ```

mod capture;
mod visitor;

use std::sync::Arc;

use crate::document::{DocumentTree, NodeId};
use crate::model::TagTaxonomy;
use crate::symbols::MethodEntity;

pub use capture::{Capture, Step};
pub use visitor::{ExpectedKeys, KeyVisitor, Visitor, walk};

/// A schema tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Scalar(Scalar),
    Container(Container),
    OneOf(Vec<Element>),
}

impl Element {
    /// A mapping with the given properties.
    pub fn map(properties: impl IntoIterator<Item = Property>) -> Self {
        Element::Container(Container::Map(properties.into_iter().collect()))
    }

    /// A sequence whose items are `item`.
    pub fn sequence(item: Element) -> Self {
        Element::Container(Container::Sequence(Box::new(item)))
    }

    /// Any one of `alternatives`.
    pub fn one_of(alternatives: impl IntoIterator<Item = Element>) -> Self {
        Element::OneOf(alternatives.into_iter().collect())
    }

    /// A scalar with the given purpose.
    pub fn scalar(scalar: Scalar) -> Self {
        Element::Scalar(scalar)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Map(Vec<Property>),
    Sequence(Box<Element>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: PropertyName,
    pub element: Element,
}

impl Property {
    /// A property under a fixed key.
    pub fn named(name: &str, element: Element) -> Self {
        Self { name: PropertyName::Exact(Arc::from(name)), element }
    }

    /// A property matching any key, e.g. user-chosen ids.
    pub fn any(element: Element) -> Self {
        Self { name: PropertyName::Any, element }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyName {
    Exact(Arc<str>),
    Any,
}

/// What the text of a scalar refers to.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Free text.
    Text,
    PhpClass(PhpClass),
    PhpMethod(PhpMethod),
    PhpField(PhpField),
    /// `Class::method` static callback.
    PhpCallback,
    FilePath(FilePath),
    /// A service id, optionally restricted to services carrying a tag.
    Service { tag: Option<Arc<str>> },
    /// A method of the service named at `service_from`.
    ServiceMethod { service_from: PropertyPath },
    /// An alias of a tag taxonomy (condition name, form type, ...).
    TagAlias(TagTaxonomy),
}

/// Class-valued scalar options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhpClass {
    /// Namespace segment candidates must live under (`Entity`, `Controller`).
    pub namespace_part: Option<Arc<str>>,
    /// Offer `BundleNamespace:Entity` shortcuts instead of class names.
    pub allow_doctrine_shortcut: bool,
}

impl PhpClass {
    /// Any class in any namespace.
    pub fn any() -> Self {
        Self::default()
    }

    /// Classes whose namespace contains the segment `part`.
    pub fn in_namespace(part: &str) -> Self {
        Self { namespace_part: Some(Arc::from(part)), allow_doctrine_shortcut: false }
    }

    /// Doctrine entities: `Entity` namespace, shortcut notation allowed.
    pub fn doctrine_entity() -> Self {
        Self { namespace_part: Some(Arc::from("Entity")), allow_doctrine_shortcut: true }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MethodMatcher {
    Static,
    NonStatic,
    #[default]
    Any,
}

impl MethodMatcher {
    /// Whether `method` passes this filter.
    pub fn matches(self, method: &MethodEntity) -> bool {
        match self {
            MethodMatcher::Static => method.is_static,
            MethodMatcher::NonStatic => !method.is_static,
            MethodMatcher::Any => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhpMethod {
    /// Where the owning class name is written, relative to the scalar.
    pub class_from: PropertyPath,
    pub matcher: MethodMatcher,
    /// Only methods whose name starts with this prefix are offered.
    pub name_prefix: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhpField {
    pub class_from: PropertyPath,
}

/// How file-path text maps onto project files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilePath {
    /// Relative to the directory of the current document.
    DocumentDir,
    /// Public module assets, written `bundles/<module>/<path>`.
    PublicResource,
    /// Script modules, written `<module>/js/<name>` without extension.
    JsModule,
}

/// A relative path from one document node to another.
///
/// `../class` climbs to the parent and descends into its `class` child,
/// i.e. names a sibling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyPath {
    up: usize,
    keys: Vec<Arc<str>>,
}

impl PropertyPath {
    /// Parse a `/`-separated path; leading `..` segments step up one level each.
    pub fn parse(path: &str) -> Self {
        let mut up = 0;
        let mut keys = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." && keys.is_empty() {
                up += 1;
            } else {
                keys.push(Arc::from(segment));
            }
        }
        Self { up, keys }
    }

    /// The key `name` next to the current node.
    pub fn sibling(name: &str) -> Self {
        Self { up: 1, keys: vec![Arc::from(name)] }
    }

    /// Follow the path from `from`.
    pub fn resolve(&self, tree: &dyn DocumentTree, from: NodeId) -> Option<NodeId> {
        let mut node = from;
        for _ in 0..self.up {
            node = tree.parent(node)?;
        }
        self.keys.iter().try_fold(node, |node, key| tree.child(node, key))
    }

    /// Text of the node the path leads to.
    pub fn text<'t>(&self, tree: &'t dyn DocumentTree, from: NodeId) -> Option<&'t str> {
        self.resolve(tree, from).and_then(|node| tree.text(node))
    }
}

/// A schema bound to the documents it describes.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    /// Path suffix of the documents this schema applies to.
    pub file_suffix: Arc<str>,
    pub root: Element,
}

impl Schema {
    /// Schema for documents whose path ends with `file_suffix`.
    pub fn new(file_suffix: &str, root: Element) -> Self {
        Self { file_suffix: Arc::from(file_suffix), root }
    }

    /// Whether this schema describes the document at `path`.
    pub fn applies_to(&self, path: &str) -> bool {
        path.ends_with(self.file_suffix.as_ref())
    }
}

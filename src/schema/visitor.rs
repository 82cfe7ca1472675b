//! Schema traversal.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::document::{DocumentTree, NodeId};

use super::{Capture, Container, Element, PropertyName, Scalar};

/// Callbacks invoked while walking a schema.
///
/// Implementations decide what a scalar position means to them (register a
/// reference provider, collect keys, ...). The schema itself is never
/// mutated.
pub trait Visitor {
    fn visit_scalar(&mut self, scalar: &Scalar, capture: &Capture);

    fn visit_container(&mut self, _container: &Container, _capture: &Capture) {}
}

/// Walk `element` depth-first, starting at `capture`.
///
/// Every alternative of a `OneOf` is visited with the same capture: which one
/// a document actually follows is only known when its nodes are matched.
pub fn walk(element: &Element, capture: &Capture, visitor: &mut dyn Visitor) {
    match element {
        Element::Scalar(scalar) => visitor.visit_scalar(scalar, capture),
        Element::OneOf(alternatives) => {
            for alternative in alternatives {
                walk(alternative, capture, visitor);
            }
        }
        Element::Container(container) => {
            visitor.visit_container(container, capture);
            match container {
                Container::Map(properties) => {
                    for property in properties {
                        let child = match &property.name {
                            PropertyName::Exact(name) => capture.key(name),
                            PropertyName::Any => capture.any_key(),
                        };
                        walk(&property.element, &child, visitor);
                    }
                }
                Container::Sequence(item) => walk(item, &capture.item(), visitor),
            }
        }
    }
}

/// Keys a mapping may contain, per capture.
#[derive(Clone, Debug, Default)]
pub struct ExpectedKeys {
    by_capture: IndexMap<Capture, IndexSet<Arc<str>>>,
}

impl ExpectedKeys {
    /// Keys expected among the children of `node`.
    pub fn keys_for(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<Arc<str>> {
        let keys: IndexSet<Arc<str>> = self
            .by_capture
            .iter()
            .filter(|(capture, _)| capture.matches(tree, node))
            .flat_map(|(_, keys)| keys.iter().cloned())
            .collect();
        keys.into_iter().collect()
    }

    /// Number of mapping nodes with expected keys.
    pub fn len(&self) -> usize {
        self.by_capture.len()
    }

    /// Check if no keys are expected anywhere.
    pub fn is_empty(&self) -> bool {
        self.by_capture.is_empty()
    }
}

/// Collects the exact property names of every map in a schema.
#[derive(Debug, Default)]
pub struct KeyVisitor {
    keys: ExpectedKeys,
}

impl KeyVisitor {
    /// Walk `root` and collect the expected keys of every mapping.
    pub fn collect(root: &Element) -> ExpectedKeys {
        let mut visitor = Self::default();
        walk(root, &Capture::root(), &mut visitor);
        visitor.keys
    }
}

impl Visitor for KeyVisitor {
    fn visit_scalar(&mut self, _scalar: &Scalar, _capture: &Capture) {}

    fn visit_container(&mut self, container: &Container, capture: &Capture) {
        let Container::Map(properties) = container else {
            return;
        };
        let keys = self.keys.by_capture.entry(capture.clone()).or_default();
        for property in properties {
            if let PropertyName::Exact(name) = &property.name {
                keys.insert(name.clone());
            }
        }
    }
}

//! Provider registration and lookup.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::document::{DocumentTree, NodeId};
use crate::schema::{Capture, Element, Scalar, Visitor, walk};

use super::{
    CallbackReference, ClassReference, FieldReference, FilePathReference, InsertHandler, MethodReference, Reference,
    ReferenceProvider, ServiceMethodReference, ServiceReference, TagAliasReference,
};

/// Turns a schema scalar's purpose into references.
#[derive(Clone, Debug)]
pub struct ScalarReferenceProvider {
    scalar: Scalar,
    insert_handler: Option<Arc<dyn InsertHandler>>,
}

impl ScalarReferenceProvider {
    /// Provider for one scalar purpose.
    pub fn new(scalar: Scalar, insert_handler: Option<Arc<dyn InsertHandler>>) -> Self {
        Self { scalar, insert_handler }
    }

    /// The scalar purpose this provider serves.
    pub fn scalar(&self) -> &Scalar {
        &self.scalar
    }
}

impl ReferenceProvider for ScalarReferenceProvider {
    fn references(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<Box<dyn Reference>> {
        let text = tree.text(node).unwrap_or_default();
        let reference: Box<dyn Reference> = match &self.scalar {
            Scalar::Text => return Vec::new(),
            Scalar::PhpClass(options) => {
                Box::new(ClassReference::new(text, options.clone()).with_insert_handler(self.insert_handler.clone()))
            }
            Scalar::PhpMethod(method) => Box::new(
                MethodReference::new(method.class_from.text(tree, node), text, method.matcher)
                    .with_name_prefix(method.name_prefix.clone()),
            ),
            Scalar::PhpField(field) => Box::new(FieldReference::new(field.class_from.text(tree, node), text)),
            Scalar::PhpCallback => Box::new(CallbackReference::new(text)),
            Scalar::FilePath(root) => Box::new(FilePathReference::new(text, root.clone())),
            Scalar::Service { tag } => Box::new(ServiceReference::new(text, tag.clone())),
            Scalar::ServiceMethod { service_from } => {
                Box::new(ServiceMethodReference::new(service_from.text(tree, node), text))
            }
            Scalar::TagAlias(taxonomy) => Box::new(TagAliasReference::new(text, *taxonomy)),
        };
        vec![reference]
    }
}

/// Providers keyed by the capture they apply to.
#[derive(Clone, Default)]
pub struct ReferenceRegistry {
    providers: Vec<(Capture, Arc<dyn ReferenceProvider>)>,
}

impl ReferenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a provider for every scalar of `schema`.
    pub fn for_schema(schema: &Element, insert_handler: Option<Arc<dyn InsertHandler>>) -> Self {
        let mut registry = Self::new();
        let mut visitor = ReferenceVisitor::new(&mut registry, insert_handler);
        walk(schema, &Capture::root(), &mut visitor);
        registry
    }

    /// Register `provider` for nodes matching `capture`.
    pub fn register(&mut self, capture: Capture, provider: Arc<dyn ReferenceProvider>) {
        trace!(%capture, "registering reference provider");
        self.providers.push((capture, provider));
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// References every matching provider creates for `node`.
    pub fn references_at(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<Box<dyn Reference>> {
        self.providers
            .iter()
            .filter(|(capture, _)| capture.matches(tree, node))
            .flat_map(|(_, provider)| provider.references(tree, node))
            .collect()
    }

    /// Every node of `tree` with at least one reference, in registration
    /// order, paired with its references.
    pub fn all_references(&self, tree: &dyn DocumentTree) -> Vec<(NodeId, Box<dyn Reference>)> {
        self.providers
            .iter()
            .flat_map(|(capture, provider)| {
                capture
                    .find_all(tree)
                    .into_iter()
                    .flat_map(|node| provider.references(tree, node).into_iter().map(move |r| (node, r)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl fmt::Debug for ReferenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.providers.iter().map(|(capture, _)| capture.to_string())).finish()
    }
}

/// Schema visitor registering a [`ScalarReferenceProvider`] per scalar.
pub struct ReferenceVisitor<'r> {
    registry: &'r mut ReferenceRegistry,
    insert_handler: Option<Arc<dyn InsertHandler>>,
}

impl<'r> ReferenceVisitor<'r> {
    /// Visitor registering a provider for every scalar it meets.
    pub fn new(registry: &'r mut ReferenceRegistry, insert_handler: Option<Arc<dyn InsertHandler>>) -> Self {
        Self { registry, insert_handler }
    }
}

impl Visitor for ReferenceVisitor<'_> {
    fn visit_scalar(&mut self, scalar: &Scalar, capture: &Capture) {
        if matches!(scalar, Scalar::Text) {
            return;
        }
        let provider = ScalarReferenceProvider::new(scalar.clone(), self.insert_handler.clone());
        self.registry.register(capture.clone(), Arc::new(provider));
    }
}

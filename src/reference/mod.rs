//! Reference resolution: what a scalar's text refers to, and what could be
//! typed there instead.
//!
//! A [`ReferenceRegistry`] is filled by walking a schema with the
//! [`ReferenceVisitor`]: every scalar capture gets a [`ReferenceProvider`].
//! At query time the provider turns a document node into [`Reference`]s,
//! each of which can
//!
//! - `resolve` its text to targets (classes, members, services, files), and
//! - list ranked completion `variants`.
//!
//! Both run against a [`ResolveCtx`] that bundles the index snapshot query,
//! the host symbol table, the known files and the settings.

mod class;
mod file_path;
mod insert;
mod member;
mod registry;
mod service;

use std::fmt;
use std::sync::Arc;

use crate::base::FileId;
use crate::document::{DocumentTree, NodeId, SourceRoot};
use crate::model::TagTaxonomy;
use crate::query::ServicesQuery;
use crate::settings::Settings;
use crate::symbols::{ClassEntity, SymbolTable};

pub use class::{ClassReference, doctrine_shortcut};
pub use file_path::{FilePathReference, StringWrapper, public_name};
pub use insert::{ComposedInsertHandler, FqnInsertHandler, InsertHandler, InsertionContext};
pub use member::{CallbackReference, FieldReference, MethodReference};
pub use registry::{ReferenceRegistry, ReferenceVisitor, ScalarReferenceProvider};
pub use service::{ServiceMethodReference, ServiceReference, TagAliasReference};

// ============================================================================
// CONTEXT
// ============================================================================

/// Everything a reference may consult while resolving.
#[derive(Clone, Copy)]
pub struct ResolveCtx<'a> {
    pub symbols: &'a dyn SymbolTable,
    pub query: ServicesQuery<'a>,
    pub files: &'a SourceRoot,
    pub settings: &'a Settings,
    /// Canonical path of the document being edited.
    pub document_path: &'a str,
}

impl fmt::Debug for ResolveCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveCtx").field("document_path", &self.document_path).finish_non_exhaustive()
    }
}

// ============================================================================
// TARGETS
// ============================================================================

/// An entity a reference resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Class(Arc<ClassEntity>),
    Method { class: Arc<ClassEntity>, name: Arc<str> },
    Field { class: Arc<ClassEntity>, name: Arc<str> },
    Service(Arc<str>),
    TagAlias { taxonomy: TagTaxonomy, alias: Arc<str> },
    File(FileId),
}

impl Target {
    /// Short human-readable name.
    pub fn display_name(&self) -> String {
        match self {
            Target::Class(class) => class.fqn.to_string(),
            Target::Method { class, name } | Target::Field { class, name } => format!("{}::{name}", class.fqn),
            Target::Service(id) => id.to_string(),
            Target::TagAlias { alias, .. } => alias.to_string(),
            Target::File(file) => file.to_string(),
        }
    }
}

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Exactly one target.
    Found(Target),
    /// Several candidates, in ranking order.
    Ambiguous(Vec<Target>),
    /// Nothing matches.
    NotFound,
}

impl ResolveResult {
    /// Classify a target list by its length.
    pub fn from_targets(mut targets: Vec<Target>) -> Self {
        match targets.len() {
            0 => ResolveResult::NotFound,
            1 => targets.pop().map_or(ResolveResult::NotFound, ResolveResult::Found),
            _ => ResolveResult::Ambiguous(targets),
        }
    }

    /// The unique target, if exactly one was found.
    pub fn target(&self) -> Option<&Target> {
        match self {
            ResolveResult::Found(target) => Some(target),
            _ => None,
        }
    }

    /// All targets, whether unique or ambiguous.
    pub fn targets(&self) -> &[Target] {
        match self {
            ResolveResult::Found(target) => std::slice::from_ref(target),
            ResolveResult::Ambiguous(targets) => targets,
            ResolveResult::NotFound => &[],
        }
    }

    /// Check if exactly one target was found.
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    /// Check if several targets were found.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }

    /// Check if nothing was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveResult::NotFound)
    }
}

// ============================================================================
// VARIANTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Class,
    /// A `Shortcut:Entity` persistence-mapping name.
    DoctrineEntity,
    Method,
    Field,
    Service,
    TagAlias,
    File,
}

/// A completion candidate offered by a reference.
#[derive(Clone, Debug)]
pub struct Variant {
    /// Text the candidate is matched and inserted by.
    pub lookup: Arc<str>,
    /// Auxiliary display text (qualified name, owning class, ...).
    pub type_text: Option<Arc<str>>,
    /// Fully-qualified class name behind the candidate, if any.
    pub fqn: Option<Arc<str>>,
    /// Higher sorts first.
    pub priority: i32,
    pub kind: VariantKind,
    pub insert_handler: Option<Arc<dyn InsertHandler>>,
}

impl Variant {
    /// Create a variant with default priority and no handler.
    pub fn new(kind: VariantKind, lookup: impl Into<Arc<str>>) -> Self {
        Self { lookup: lookup.into(), type_text: None, fqn: None, priority: 0, kind, insert_handler: None }
    }

    /// Set the text shown next to the lookup string.
    pub fn with_type_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.type_text = Some(text.into());
        self
    }

    /// Set the qualified name the variant stands for.
    pub fn with_fqn(mut self, fqn: impl Into<Arc<str>>) -> Self {
        self.fqn = Some(fqn.into());
        self
    }

    /// Set the ranking priority; higher sorts first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the insertion side effect.
    pub fn with_insert_handler(mut self, handler: Option<Arc<dyn InsertHandler>>) -> Self {
        self.insert_handler = handler;
        self
    }

    /// Run the insert handler, if any, after `lookup` was inserted.
    pub fn handle_insert(&self, ctx: &mut InsertionContext) {
        if let Some(handler) = &self.insert_handler {
            handler.handle_insert(ctx, self);
        }
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// A resolvable span of text.
pub trait Reference: fmt::Debug + Send + Sync {
    /// The (raw) text the reference was created from.
    fn text(&self) -> &str;

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult;

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant>;

    /// Kind of entity this reference names, for diagnostics.
    fn kind(&self) -> VariantKind;
}

/// Creates references for a document node.
pub trait ReferenceProvider: Send + Sync {
    fn references(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<Box<dyn Reference>>;
}

/// Stable sort, highest priority first.
pub(crate) fn rank(variants: &mut [Variant]) {
    variants.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
pub(crate) struct Fixture {
    pub symbols: crate::symbols::MemorySymbolTable,
    pub snapshot: crate::index::Snapshot,
    pub files: SourceRoot,
    pub settings: Settings,
}

#[cfg(test)]
impl Fixture {
    pub fn new() -> Self {
        Self {
            symbols: Default::default(),
            snapshot: Default::default(),
            files: SourceRoot::new(),
            settings: Settings::default(),
        }
    }

    pub fn ctx<'a>(&'a self, document_path: &'a str) -> ResolveCtx<'a> {
        ResolveCtx {
            symbols: &self.symbols,
            query: ServicesQuery::new(&self.snapshot),
            files: &self.files,
            settings: &self.settings,
            document_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_result_from_targets() {
        assert!(ResolveResult::from_targets(Vec::new()).is_not_found());

        let one = ResolveResult::from_targets(vec![Target::Service(Arc::from("a"))]);
        assert_eq!(one.target(), Some(&Target::Service(Arc::from("a"))));

        let many = ResolveResult::from_targets(vec![Target::Service(Arc::from("a")), Target::File(FileId::new(1))]);
        assert!(many.is_ambiguous());
        assert_eq!(many.targets().len(), 2);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut variants = vec![
            Variant::new(VariantKind::Class, "a").with_priority(0),
            Variant::new(VariantKind::Class, "b").with_priority(-1),
            Variant::new(VariantKind::Class, "c").with_priority(1),
            Variant::new(VariantKind::Class, "d").with_priority(0),
        ];
        rank(&mut variants);
        let order: Vec<_> = variants.iter().map(|v| v.lookup.as_ref()).collect();
        assert_eq!(order, vec!["c", "a", "d", "b"]);
    }
}

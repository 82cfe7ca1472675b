//! Completion: value and key candidates for a document node.

use std::ops::Range;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::document::{DocumentTree, NodeId};
use crate::reference::{InsertHandler, InsertionContext, ReferenceRegistry, ResolveCtx, Variant, VariantKind};
use crate::schema::ExpectedKeys;

/// The kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Class,
    Entity,
    Method,
    Field,
    Service,
    Alias,
    File,
    /// A mapping key the schema expects.
    Key,
}

impl From<VariantKind> for CompletionKind {
    fn from(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Class => CompletionKind::Class,
            VariantKind::DoctrineEntity => CompletionKind::Entity,
            VariantKind::Method => CompletionKind::Method,
            VariantKind::Field => CompletionKind::Field,
            VariantKind::Service => CompletionKind::Service,
            VariantKind::TagAlias => CompletionKind::Alias,
            VariantKind::File => CompletionKind::File,
        }
    }
}

/// A completion item.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// Text shown in the list and inserted on accept.
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Qualified name or owner shown next to the label.
    pub detail: Option<Arc<str>>,
    /// Higher sorts first.
    pub priority: i32,
    variant: Option<Variant>,
}

impl CompletionItem {
    /// A mapping key completion.
    pub fn key(name: impl Into<Arc<str>>) -> Self {
        Self { label: name.into(), kind: CompletionKind::Key, detail: None, priority: 0, variant: None }
    }

    /// Insertion side effects of this item, if any.
    pub fn insert_handler(&self) -> Option<&Arc<dyn InsertHandler>> {
        self.variant.as_ref().and_then(|variant| variant.insert_handler.as_ref())
    }

    /// Document text after accepting this item over `range`.
    pub fn apply(&self, text: &str, range: Range<usize>) -> String {
        let mut ctx = InsertionContext::insert(text, range, &self.label);
        if let Some(variant) = &self.variant {
            variant.handle_insert(&mut ctx);
        }
        ctx.text
    }
}

impl From<Variant> for CompletionItem {
    fn from(variant: Variant) -> Self {
        Self {
            label: variant.lookup.clone(),
            kind: variant.kind.into(),
            detail: variant.type_text.clone(),
            priority: variant.priority,
            variant: Some(variant),
        }
    }
}

/// Value completions for `node`, highest priority first. Items of equal
/// priority keep the order their references produced them in.
pub fn completions(
    ctx: &ResolveCtx<'_>,
    registry: &ReferenceRegistry,
    tree: &dyn DocumentTree,
    node: NodeId,
) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = registry
        .references_at(tree, node)
        .iter()
        .flat_map(|reference| reference.variants(ctx))
        .map(CompletionItem::from)
        .collect();
    items.sort_by(|a, b| b.priority.cmp(&a.priority));
    items
}

/// Keys the schema expects among the children of `node` that are not
/// present yet.
pub fn key_completions(keys: &ExpectedKeys, tree: &dyn DocumentTree, node: NodeId) -> Vec<CompletionItem> {
    let present: IndexSet<&str> = tree.children(node).iter().filter_map(|&child| tree.key(child)).collect();
    keys.keys_for(tree, node)
        .into_iter()
        .filter(|key| !present.contains(key.as_ref()))
        .map(CompletionItem::key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::yaml;
    use crate::schema::{Element, KeyVisitor, Property, Scalar};

    #[test]
    fn test_key_completions_skip_present_keys() {
        let schema = Element::map([Property::named(
            "operations",
            Element::map([Property::any(Element::map([
                Property::named("label", Element::scalar(Scalar::Text)),
                Property::named("enabled", Element::scalar(Scalar::Text)),
                Property::named("order", Element::scalar(Scalar::Text)),
            ]))]),
        )]);
        let keys = KeyVisitor::collect(&schema);
        let tree = yaml::parse("/actions.yml", "operations:\n    first:\n        label: First\n").unwrap();

        let node = tree.node_at(&["operations", "first"]).unwrap();
        let labels: Vec<_> = key_completions(&keys, &tree, node).iter().map(|i| i.label.to_string()).collect();
        assert_eq!(labels, vec!["enabled", "order"]);
    }

    #[test]
    fn test_item_from_variant_applies_handler() {
        use crate::reference::FqnInsertHandler;

        let variant = Variant::new(VariantKind::Class, "Post")
            .with_fqn("Acme\\Post")
            .with_type_text("Acme")
            .with_insert_handler(Some(Arc::new(FqnInsertHandler)));
        let item = CompletionItem::from(variant);

        assert_eq!(item.kind, CompletionKind::Class);
        assert_eq!(item.detail.as_deref(), Some("Acme"));
        assert!(item.insert_handler().is_some());
        assert_eq!(item.apply("class: Po", 7..9), "class: Acme\\Post");
    }
}

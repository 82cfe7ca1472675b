//! Service ids, methods of services and tag aliases.

use std::sync::Arc;

use crate::model::TagTaxonomy;
use crate::schema::MethodMatcher;

use super::{MethodReference, Reference, ResolveCtx, ResolveResult, Target, Variant, VariantKind};

/// Prefix marking a service reference in map-style configuration.
const SERVICE_PREFIX: char = '@';

fn service_id(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix(SERVICE_PREFIX).unwrap_or(text)
}

/// A service id, optionally restricted to services carrying a tag.
#[derive(Clone, Debug)]
pub struct ServiceReference {
    text: String,
    tag: Option<Arc<str>>,
}

impl ServiceReference {
    /// Reference to a service id, optionally restricted to a tag.
    pub fn new(text: &str, tag: Option<Arc<str>>) -> Self {
        Self { text: text.to_string(), tag }
    }

    fn accepts(&self, ctx: &ResolveCtx<'_>, id: &str) -> bool {
        match &self.tag {
            Some(tag) => ctx.query.services(id).iter().any(|service| service.has_tag(tag)),
            None => true,
        }
    }
}

impl Reference for ServiceReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        let id = service_id(&self.text);
        match ctx.query.find_service(id) {
            Some(service) if self.accepts(ctx, id) => ResolveResult::Found(Target::Service(service.id.clone())),
            _ => ResolveResult::NotFound,
        }
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        ctx.query
            .service_ids()
            .into_iter()
            .filter(|id| self.accepts(ctx, id))
            .map(|id| {
                let variant = Variant::new(VariantKind::Service, id);
                match ctx.query.service_class(id) {
                    Some(class) => variant.with_type_text(class),
                    None => variant,
                }
            })
            .collect()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Service
    }
}

/// A method of the service named by another node.
///
/// Service → class (one parameter hop) → method. If any hop fails the
/// reference resolves to nothing and offers nothing.
#[derive(Clone, Debug)]
pub struct ServiceMethodReference {
    service_text: Option<String>,
    text: String,
}

impl ServiceMethodReference {
    /// Reference to a method of the service named by `service_text`.
    pub fn new(service_text: Option<&str>, text: &str) -> Self {
        Self { service_text: service_text.map(str::to_string), text: text.to_string() }
    }

    fn inner(&self, ctx: &ResolveCtx<'_>) -> Option<MethodReference> {
        let id = service_id(self.service_text.as_deref()?);
        let class = ctx.query.service_class(id)?;
        Some(MethodReference::new(Some(class), &self.text, MethodMatcher::NonStatic))
    }
}

impl Reference for ServiceMethodReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        self.inner(ctx).map_or(ResolveResult::NotFound, |inner| inner.resolve(ctx))
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        self.inner(ctx).map(|inner| inner.variants(ctx)).unwrap_or_default()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Method
    }
}

/// An alias registered under a tag taxonomy (condition, action, form type...).
#[derive(Clone, Debug)]
pub struct TagAliasReference {
    text: String,
    taxonomy: TagTaxonomy,
}

impl TagAliasReference {
    /// Reference to an alias of the `taxonomy` tag.
    pub fn new(text: &str, taxonomy: TagTaxonomy) -> Self {
        Self { text: text.to_string(), taxonomy }
    }

    fn aliases<'a>(&self, ctx: &ResolveCtx<'a>) -> Vec<&'a str> {
        match self.taxonomy {
            TagTaxonomy::ApiFormType => ctx.query.api_form_types().into_iter().collect(),
            taxonomy => ctx.query.aliases(taxonomy).into_iter().collect(),
        }
    }
}

impl Reference for TagAliasReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        // conditions and actions may carry a leading `@`
        let alias = service_id(&self.text);
        match self.aliases(ctx).into_iter().find(|candidate| *candidate == alias) {
            Some(found) => ResolveResult::Found(Target::TagAlias { taxonomy: self.taxonomy, alias: Arc::from(found) }),
            None => ResolveResult::NotFound,
        }
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        self.aliases(ctx)
            .into_iter()
            .map(|alias| Variant::new(VariantKind::TagAlias, alias).with_type_text(self.taxonomy.tag_name()))
            .collect()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::TagAlias
    }
}

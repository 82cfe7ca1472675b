//! Method, field and callback scalars.

use std::sync::Arc;

use crate::schema::{MethodMatcher, PhpClass};
use crate::symbols::ClassEntity;

use super::{ClassReference, Reference, ResolveCtx, ResolveResult, Target, Variant, VariantKind};

const CALLBACK_SEPARATOR: &str = "::";

/// The owning class of a member: the first class the owner text resolves to.
fn owner(class_text: &str, ctx: &ResolveCtx<'_>) -> Option<Arc<ClassEntity>> {
    ClassReference::new(class_text, PhpClass::any()).resolve_classes(ctx).into_iter().next()
}

/// A method of a class named elsewhere in the document.
#[derive(Clone, Debug)]
pub struct MethodReference {
    class_text: Option<String>,
    text: String,
    matcher: MethodMatcher,
    name_prefix: Option<Arc<str>>,
}

impl MethodReference {
    /// Reference to a method of the class named by `class_text`.
    pub fn new(class_text: Option<&str>, text: &str, matcher: MethodMatcher) -> Self {
        Self { class_text: class_text.map(str::to_string), text: text.to_string(), matcher, name_prefix: None }
    }

    /// Only offer methods whose name starts with `prefix`.
    pub fn with_name_prefix(mut self, prefix: Option<Arc<str>>) -> Self {
        self.name_prefix = prefix;
        self
    }

    fn owner(&self, ctx: &ResolveCtx<'_>) -> Option<Arc<ClassEntity>> {
        owner(self.class_text.as_deref()?, ctx)
    }
}

impl Reference for MethodReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        let Some(class) = self.owner(ctx) else {
            return ResolveResult::NotFound;
        };
        let targets = class
            .method(self.text.trim())
            .filter(|method| self.matcher.matches(method))
            .map(|method| Target::Method { class: class.clone(), name: method.name.clone() });
        ResolveResult::from_targets(targets.into_iter().collect())
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        let Some(class) = self.owner(ctx) else {
            return Vec::new();
        };
        class
            .methods
            .iter()
            .filter(|method| self.matcher.matches(method))
            .filter(|method| self.name_prefix.as_deref().is_none_or(|prefix| method.name.starts_with(prefix)))
            .map(|method| Variant::new(VariantKind::Method, method.name.clone()).with_type_text(class.name()))
            .collect()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Method
    }
}

/// A property of a class named elsewhere in the document.
#[derive(Clone, Debug)]
pub struct FieldReference {
    class_text: Option<String>,
    text: String,
}

impl FieldReference {
    /// Reference to a field of the class named by `class_text`.
    pub fn new(class_text: Option<&str>, text: &str) -> Self {
        Self { class_text: class_text.map(str::to_string), text: text.to_string() }
    }

    fn owner(&self, ctx: &ResolveCtx<'_>) -> Option<Arc<ClassEntity>> {
        owner(self.class_text.as_deref()?, ctx)
    }
}

impl Reference for FieldReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        let Some(class) = self.owner(ctx) else {
            return ResolveResult::NotFound;
        };
        let targets = class
            .field(self.text.trim())
            .filter(|field| !field.is_constant)
            .map(|field| Target::Field { class: class.clone(), name: field.name.clone() });
        ResolveResult::from_targets(targets.into_iter().collect())
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        let Some(class) = self.owner(ctx) else {
            return Vec::new();
        };
        class
            .fields
            .iter()
            .filter(|field| !field.is_constant)
            .map(|field| Variant::new(VariantKind::Field, field.name.clone()).with_type_text(class.name()))
            .collect()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Field
    }
}

/// A `Class::method` static callback.
///
/// Before the separator is typed the text is completed as a class name.
#[derive(Clone, Debug)]
pub struct CallbackReference {
    text: String,
}

impl CallbackReference {
    /// Reference to a callback written as `Class::method`.
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }

    fn split(&self) -> Option<(&str, &str)> {
        self.text.split_once(CALLBACK_SEPARATOR)
    }
}

impl Reference for CallbackReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        match self.split() {
            Some((class, method)) => MethodReference::new(Some(class), method, MethodMatcher::Static).resolve(ctx),
            None => ClassReference::new(&self.text, PhpClass::any()).resolve(ctx),
        }
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        let Some((class, method)) = self.split() else {
            return ClassReference::new(&self.text, PhpClass::any()).variants(ctx);
        };
        let class = class.trim();
        MethodReference::new(Some(class), method, MethodMatcher::Static)
            .variants(ctx)
            .into_iter()
            .map(|variant| Variant { lookup: Arc::from(format!("{class}{CALLBACK_SEPARATOR}{}", variant.lookup)), ..variant })
            .collect()
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Method
    }
}

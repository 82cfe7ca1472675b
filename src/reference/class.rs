//! Class-valued scalars.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::base::path;
use crate::schema::PhpClass;
use crate::settings::Settings;
use crate::symbols::{CamelHumpMatcher, ClassEntity};

use super::{
    ComposedInsertHandler, FqnInsertHandler, InsertHandler, Reference, ResolveCtx, ResolveResult, Target, Variant,
    VariantKind, rank,
};

const ENTITY_SEGMENT: &str = "\\Entity\\";

/// A class name, a partial class name or a `Shortcut:Name` reference.
#[derive(Clone, Debug)]
pub struct ClassReference {
    text: String,
    options: PhpClass,
    skipped: IndexSet<Arc<str>>,
    insert_handler: Option<Arc<dyn InsertHandler>>,
}

impl ClassReference {
    /// Reference for the class-valued `text`.
    pub fn new(text: &str, options: PhpClass) -> Self {
        Self { text: text.to_string(), options, skipped: IndexSet::new(), insert_handler: None }
    }

    /// Never offer these classes, e.g. the class being edited.
    pub fn skipping(mut self, fqns: impl IntoIterator<Item = Arc<str>>) -> Self {
        self.skipped.extend(fqns);
        self
    }

    /// Handler run after the structural default when a variant is accepted.
    pub fn with_insert_handler(mut self, handler: Option<Arc<dyn InsertHandler>>) -> Self {
        self.insert_handler = handler;
        self
    }

    /// Text with the editor placeholder removed and escaped separators
    /// collapsed.
    pub fn normalized(&self, settings: &Settings) -> String {
        let text = if settings.placeholder_marker.is_empty() {
            self.text.clone()
        } else {
            self.text.replace(settings.placeholder_marker.as_str(), "")
        };
        text.trim().replace("\\\\", "\\")
    }

    /// Every qualified name the text may denote: the text itself plus each
    /// shortcut expansion whose namespace matches. Doctrine shortcuts must
    /// name the entity exactly.
    pub fn class_names(&self, ctx: &ResolveCtx<'_>) -> IndexSet<String> {
        let text = self.normalized(ctx.settings);
        let mut names = IndexSet::new();
        if let Some((shortcut, right)) = text.split_once(':') {
            let right = right.trim_start_matches('\\');
            for class in ctx.symbols.classes_by_name(path::simple_name(right)) {
                let matches = if self.options.allow_doctrine_shortcut {
                    doctrine_shortcut(&class.fqn).is_some_and(|name| name.eq_ignore_ascii_case(&text))
                } else {
                    strip_qualified_suffix(&class.fqn, right)
                        .is_some_and(|namespace| matches_shortcut(shortcut, namespace))
                };
                if matches {
                    names.insert(class.fqn.to_string());
                }
            }
        }
        names.insert(text.trim_start_matches('\\').to_string());
        names
    }

    /// Classes the text resolves to, interfaces and traits included.
    pub fn resolve_classes(&self, ctx: &ResolveCtx<'_>) -> Vec<Arc<ClassEntity>> {
        let mut seen = IndexSet::new();
        self.class_names(ctx)
            .iter()
            .flat_map(|name| ctx.symbols.classes_by_fqn(name))
            .filter(|class| seen.insert(class.fqn.clone()))
            .collect()
    }

    fn candidates(&self, ctx: &ResolveCtx<'_>, text: &str) -> Vec<Arc<ClassEntity>> {
        if let Some((shortcut, right)) = text.split_once(':') {
            let right = right.trim_start_matches('\\');
            let nested = path::namespace_of(right);
            return ctx
                .symbols
                .classes_by_name_prefix(path::simple_name(right))
                .into_iter()
                .filter(|class| {
                    let namespace =
                        if nested.is_empty() { Some(class.namespace()) } else { strip_qualified_suffix(class.namespace(), nested) };
                    namespace.is_some_and(|namespace| matches_shortcut(shortcut, namespace))
                })
                .collect();
        }

        let typed_namespace = path::namespace_of(text).to_lowercase();
        let matcher = CamelHumpMatcher::new(path::simple_name(text));
        ctx.symbols
            .all_class_names(&matcher)
            .iter()
            .flat_map(|name| ctx.symbols.classes_by_name(name))
            .filter(|class| class.namespace().to_lowercase().starts_with(&typed_namespace))
            .collect()
    }

    fn accepts(&self, class: &ClassEntity, settings: &Settings) -> bool {
        let namespace_name = class.namespace_name();
        let in_part = match &self.options.namespace_part {
            Some(part) => namespace_name.contains(&format!("\\{part}\\")),
            None => true,
        };
        !class.is_interface()
            && !class.is_trait()
            && !self.skipped.contains(class.fqn.as_ref())
            && in_part
            && !settings.is_ignored_namespace(&namespace_name)
    }

    /// −1 for vendored classes, 1 when the class belongs to the module of the
    /// edited document, 0 otherwise.
    ///
    /// Module membership is a path-suffix test: the namespace, written as a
    /// path and cut at the namespace part, must end the module root.
    fn priority(&self, class: &ClassEntity, module_root: &str, settings: &Settings) -> i32 {
        if class.file_path.as_deref().is_some_and(|file| path::is_vendored(file, &settings.vendor_marker)) {
            return -1;
        }
        let namespace_path = class.namespace_name().replace('\\', "/");
        let class_root = match &self.options.namespace_part {
            Some(part) => match namespace_path.find(&format!("/{part}/")) {
                Some(idx) => &namespace_path[..idx],
                None => namespace_path.as_str(),
            },
            None => namespace_path.trim_end_matches('/'),
        };
        if !class_root.is_empty() && module_root.ends_with(class_root) { 1 } else { 0 }
    }

    fn variant_for(&self, class: &ClassEntity, priority: i32) -> Option<Variant> {
        if self.options.allow_doctrine_shortcut {
            let shortcut = doctrine_shortcut(&class.fqn)?;
            return Some(
                Variant::new(VariantKind::DoctrineEntity, shortcut)
                    .with_type_text(class.fqn.clone())
                    .with_fqn(class.fqn.clone())
                    .with_priority(priority)
                    .with_insert_handler(self.insert_handler.clone()),
            );
        }
        let handler = ComposedInsertHandler::with_default(Arc::new(FqnInsertHandler), self.insert_handler.clone());
        Some(
            Variant::new(VariantKind::Class, class.name())
                .with_type_text(class.namespace())
                .with_fqn(class.fqn.clone())
                .with_priority(priority)
                .with_insert_handler(Some(handler)),
        )
    }
}

impl Reference for ClassReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        ResolveResult::from_targets(self.resolve_classes(ctx).into_iter().map(Target::Class).collect())
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        let text = self.normalized(ctx.settings);
        let module_root = path::module_root(ctx.document_path, &ctx.settings.module_root_marker);

        let mut variants: Vec<Variant> = self
            .candidates(ctx, &text)
            .iter()
            .filter(|class| self.accepts(class, ctx.settings))
            .filter_map(|class| self.variant_for(class, self.priority(class, module_root, ctx.settings)))
            .collect();
        rank(&mut variants);
        variants
    }

    fn kind(&self) -> VariantKind {
        if self.options.allow_doctrine_shortcut { VariantKind::DoctrineEntity } else { VariantKind::Class }
    }
}

/// Whether `shortcut` camel-hump start-matches `namespace` with separators
/// removed, starting from any of its segments.
fn matches_shortcut(shortcut: &str, namespace: &str) -> bool {
    let matcher = CamelHumpMatcher::new(shortcut);
    let segments: Vec<&str> = namespace.split('\\').filter(|s| !s.is_empty()).collect();
    (0..segments.len()).any(|start| matcher.is_start_match(&segments[start..].concat()))
}

/// `name` without a trailing `\suffix`, compared case-insensitively.
///
/// `strip_qualified_suffix("Acme\Entity\Sub\Post", "Sub\Post")` is `Acme\Entity`.
fn strip_qualified_suffix<'n>(name: &'n str, suffix: &str) -> Option<&'n str> {
    let name = name.trim_start_matches('\\');
    let cut = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(cut) {
        return None;
    }
    let (head, tail) = name.split_at(cut);
    if !tail.eq_ignore_ascii_case(suffix) {
        return None;
    }
    head.strip_suffix('\\')
}

/// `Acme\DemoBundle\Entity\Post` → `AcmeDemoBundle:Post`.
///
/// Classes outside an `Entity` namespace have no shortcut.
pub fn doctrine_shortcut(fqn: &str) -> Option<String> {
    let fqn = fqn.trim_start_matches('\\');
    let idx = fqn.find(ENTITY_SEGMENT)?;
    let namespace = fqn[..idx].replace('\\', "");
    let rest = &fqn[idx + ENTITY_SEGMENT.len()..];
    Some(format!("{namespace}:{rest}"))
}

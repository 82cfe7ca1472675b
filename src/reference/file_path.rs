//! File-path scalars.
//!
//! Paths are not always written relative to a directory as-is. Public
//! assets are addressed through the web directory they are published to
//! (`bundles/acmedemo/css/app.css`), script modules through their module
//! name (`acmedemo/js/app/view`). A [`StringWrapper`] maps between the text
//! as written and the path relative to the source directory.

use indexmap::IndexSet;

use crate::base::path;
use crate::schema::FilePath;

use super::{Reference, ResolveCtx, ResolveResult, Target, Variant, VariantKind};

const PUBLIC_DIR: &str = "public";
const PUBLIC_PREFIX: &str = "bundles/";
const JS_DIR: &str = "js";
const JS_SUFFIX: &str = ".js";

/// Prefix and suffix added around a source-relative path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringWrapper {
    prefix: String,
    suffix: String,
}

impl StringWrapper {
    /// Create a file path from its directory prefix and name suffix.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), suffix: suffix.into() }
    }

    /// The directory part.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The name part.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Rewrite the prefix.
    pub fn map_prefix(self, f: impl FnOnce(&str) -> String) -> Self {
        Self { prefix: f(&self.prefix), ..self }
    }

    /// Rewrite the suffix.
    pub fn map_suffix(self, f: impl FnOnce(&str) -> String) -> Self {
        Self { suffix: f(&self.suffix), ..self }
    }

    /// Source-relative path → text as written. `None` when the path lacks
    /// the suffix.
    pub fn wrap(&self, relative: &str) -> Option<String> {
        relative.strip_suffix(self.suffix.as_str()).map(|stem| format!("{}{stem}", self.prefix))
    }

    /// Text as written → source-relative path. `None` when the text lacks
    /// the prefix.
    pub fn unwrap(&self, text: &str) -> Option<String> {
        text.strip_prefix(self.prefix.as_str()).map(|rest| format!("{rest}{}", self.suffix))
    }
}

/// Name a module's public assets are published under.
///
/// Namespace segments after the last `src` directory, without `Bundle`
/// segments and suffixes, lowercased: `/p/src/Oro/Bundle/ActionBundle` →
/// `oroaction`.
pub fn public_name(module_root: &str) -> Option<String> {
    let segments: Vec<&str> = module_root.split('/').filter(|s| !s.is_empty()).collect();
    let start = segments
        .iter()
        .rposition(|segment| *segment == "src")
        .map_or(segments.len().saturating_sub(2), |idx| idx + 1);
    let name = segments[start..]
        .iter()
        .filter(|segment| **segment != "Bundle")
        .map(|segment| segment.strip_suffix("Bundle").unwrap_or(*segment))
        .collect::<String>()
        .to_lowercase();
    (!name.is_empty()).then_some(name)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SourceDir {
    dir: String,
    wrapper: StringWrapper,
}

#[derive(Clone, Debug)]
pub struct FilePathReference {
    text: String,
    root: FilePath,
}

impl FilePathReference {
    /// Reference to a file below `root`.
    pub fn new(text: &str, root: FilePath) -> Self {
        Self { text: text.to_string(), root }
    }

    fn normalized(&self, ctx: &ResolveCtx<'_>) -> String {
        let marker = ctx.settings.placeholder_marker.as_str();
        let text = if marker.is_empty() { self.text.clone() } else { self.text.replace(marker, "") };
        text.trim().to_string()
    }

    fn source_dirs(&self, ctx: &ResolveCtx<'_>) -> Vec<SourceDir> {
        match self.root {
            FilePath::DocumentDir => {
                let dir = ctx.document_path.rsplit_once('/').map_or("", |(dir, _)| dir);
                vec![SourceDir { dir: dir.to_string(), wrapper: StringWrapper::default() }]
            }
            FilePath::PublicResource => public_dirs(ctx).collect(),
            FilePath::JsModule => public_dirs(ctx)
                .map(|public| SourceDir {
                    dir: format!("{}/{JS_DIR}", public.dir),
                    wrapper: public
                        .wrapper
                        .map_prefix(|prefix| format!("{}{JS_DIR}/", prefix.replacen(PUBLIC_PREFIX, "", 1)))
                        .map_suffix(|_| JS_SUFFIX.to_string()),
                })
                .collect(),
        }
    }
}

/// Public directories of every module that has published files.
fn public_dirs<'a>(ctx: &ResolveCtx<'a>) -> impl Iterator<Item = SourceDir> + 'a {
    let marker = ctx.settings.module_root_marker.as_str();
    let public_marker = format!("{marker}{PUBLIC_DIR}/");
    let modules: IndexSet<&'a str> = ctx
        .files
        .iter()
        .filter(|(_, file)| file.contains(&public_marker))
        .map(|(_, file)| path::module_root(file, marker))
        .collect();
    modules.into_iter().filter_map(move |module| {
        let name = public_name(module)?;
        Some(SourceDir {
            dir: format!("{module}{marker}{PUBLIC_DIR}"),
            wrapper: StringWrapper::new(format!("{PUBLIC_PREFIX}{name}/"), ""),
        })
    })
}

impl Reference for FilePathReference {
    fn text(&self) -> &str {
        &self.text
    }

    fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult {
        let text = self.normalized(ctx);
        let targets = self
            .source_dirs(ctx)
            .into_iter()
            .filter_map(|source| {
                let relative = source.wrapper.unwrap(&text)?;
                ctx.files.file_for_path(&format!("{}/{relative}", source.dir))
            })
            .map(Target::File)
            .collect();
        ResolveResult::from_targets(targets)
    }

    fn variants(&self, ctx: &ResolveCtx<'_>) -> Vec<Variant> {
        let mut variants = Vec::new();
        for source in self.source_dirs(ctx) {
            for (file, relative) in ctx.files.files_under(&source.dir) {
                if ctx.files.path(file) == Some(ctx.document_path) {
                    continue;
                }
                if let Some(text) = source.wrapper.wrap(relative) {
                    variants.push(Variant::new(VariantKind::File, text));
                }
            }
        }
        variants
    }

    fn kind(&self) -> VariantKind {
        VariantKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::reference::Fixture;
    use rstest::rstest;

    const DOCUMENT: &str = "/p/src/Acme/DemoBundle/Resources/config/oro/assets.yml";

    fn fixture() -> Fixture {
        let mut fixture = Fixture::new();
        fixture.files.insert(FileId::new(0), DOCUMENT);
        fixture.files.insert(FileId::new(1), "/p/src/Acme/DemoBundle/Resources/config/oro/navigation.yml");
        fixture.files.insert(FileId::new(2), "/p/src/Acme/DemoBundle/Resources/public/css/app.css");
        fixture.files.insert(FileId::new(3), "/p/src/Acme/DemoBundle/Resources/public/js/app/view.js");
        fixture.files.insert(FileId::new(4), "/p/src/Acme/DemoBundle/Resources/public/js/app/view.tpl");
        fixture
    }

    fn lookups(variants: Vec<Variant>) -> Vec<String> {
        variants.into_iter().map(|v| v.lookup.to_string()).collect()
    }

    #[rstest]
    #[case("/p/src/Acme/DemoBundle", Some("acmedemo"))]
    #[case("/p/vendor/oro/platform/src/Oro/Bundle/ActionBundle", Some("oroaction"))]
    #[case("/Acme/DemoBundle", Some("acmedemo"))]
    #[case("/", None)]
    fn test_public_name(#[case] module_root: &str, #[case] expected: Option<&str>) {
        assert_eq!(public_name(module_root).as_deref(), expected);
    }

    #[test]
    fn test_string_wrapper() {
        let wrapper = StringWrapper::new("bundles/acmedemo/", "").map_prefix(|p| format!("{}js/", p.replace("bundles/", ""))).map_suffix(|_| ".js".to_string());
        assert_eq!(wrapper.prefix(), "acmedemo/js/");
        assert_eq!(wrapper.wrap("app/view.js").as_deref(), Some("acmedemo/js/app/view"));
        assert_eq!(wrapper.wrap("app/view.tpl"), None);
        assert_eq!(wrapper.unwrap("acmedemo/js/app/view").as_deref(), Some("app/view.js"));
        assert_eq!(wrapper.unwrap("other/js/app/view"), None);
    }

    #[test]
    fn test_document_dir() {
        let fixture = fixture();
        let ctx = fixture.ctx(DOCUMENT);

        let reference = FilePathReference::new("navigation.yml", FilePath::DocumentDir);
        assert_eq!(reference.resolve(&ctx).target(), Some(&Target::File(FileId::new(1))));
        assert_eq!(lookups(reference.variants(&ctx)), vec!["navigation.yml"]);
    }

    #[test]
    fn test_public_resource() {
        let fixture = fixture();
        let ctx = fixture.ctx(DOCUMENT);

        let reference = FilePathReference::new("bundles/acmedemo/css/app.css", FilePath::PublicResource);
        assert_eq!(reference.resolve(&ctx).target(), Some(&Target::File(FileId::new(2))));
        assert_eq!(
            lookups(reference.variants(&ctx)),
            vec!["bundles/acmedemo/css/app.css", "bundles/acmedemo/js/app/view.js", "bundles/acmedemo/js/app/view.tpl"]
        );
    }

    #[test]
    fn test_js_module() {
        let fixture = fixture();
        let ctx = fixture.ctx(DOCUMENT);

        let reference = FilePathReference::new("acmedemo/js/app/view", FilePath::JsModule);
        assert_eq!(reference.resolve(&ctx).target(), Some(&Target::File(FileId::new(3))));
        assert_eq!(lookups(reference.variants(&ctx)), vec!["acmedemo/js/app/view"]);
        assert!(FilePathReference::new("acmedemo/js/app/missing", FilePath::JsModule).resolve(&ctx).is_not_found());
    }
}

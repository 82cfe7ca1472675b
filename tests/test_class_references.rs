//! Class reference completion and resolution through the analysis host.
//!
//! Checks ranking of module, project and vendored classes, namespace
//! filtering, `Shortcut:Name` references and insert handler composition.

use std::sync::Arc;

use symfref::AnalysisHost;
use symfref::document::{DocumentTree, parse_document};
use symfref::ide::CompletionKind;
use symfref::reference::{InsertHandler, InsertionContext, ResolveResult, Target, Variant};
use symfref::schema::{Element, PhpClass, Property, Scalar, Schema};
use symfref::settings::Settings;
use symfref::symbols::ClassEntity;

const ACTIONS: &str = "/p/src/Acme/DemoBundle/Resources/config/oro/actions.yml";

fn schema() -> Schema {
    Schema::new(
        "actions.yml",
        Element::map([Property::named(
            "operations",
            Element::map([Property::any(Element::map([
                Property::named("entity", Element::scalar(Scalar::PhpClass(PhpClass::in_namespace("Entity")))),
                Property::named("class", Element::scalar(Scalar::PhpClass(PhpClass::any()))),
                Property::named("shortcut", Element::scalar(Scalar::PhpClass(PhpClass::doctrine_entity()))),
            ]))]),
        )]),
    )
}

fn host() -> AnalysisHost {
    let mut host = AnalysisHost::new(Settings::default());
    host.add_schema(schema(), None);
    host.set_classes(
        "/p/src/Other/Bundle/Entity/Post.php",
        vec![ClassEntity::new("Other\\Bundle\\Entity\\Post").in_file("/p/src/Other/Bundle/Entity/Post.php")],
    );
    host.set_classes(
        "/p/vendor/lib/src/Entity/Post.php",
        vec![ClassEntity::new("Vendor\\Lib\\Entity\\Post").in_file("/p/vendor/lib/src/Entity/Post.php")],
    );
    host.set_classes(
        "/p/src/Acme/DemoBundle/Entity/Post.php",
        vec![ClassEntity::new("Acme\\DemoBundle\\Entity\\Post").in_file("/p/src/Acme/DemoBundle/Entity/Post.php")],
    );
    host.set_classes(
        "/p/src/Acme/DemoBundle/Tests/Entity/Post.php",
        vec![ClassEntity::new("Acme\\DemoBundle\\Tests\\Entity\\Post")],
    );
    host.set_classes(
        "/p/src/App/Foo/Controllers.php",
        vec![ClassEntity::new("App\\Foo\\BarController"), ClassEntity::new("App\\Foo\\BazController")],
    );
    host
}

fn fqns(host: &AnalysisHost, text: &str, keys: &[&str]) -> Vec<String> {
    let tree = parse_document(ACTIONS, text).unwrap();
    let node = tree.node_at(keys).unwrap();
    host.analysis()
        .completions(&tree, node)
        .into_iter()
        .map(|item| format!("{}\\{}", item.detail.as_deref().unwrap_or_default(), item.label))
        .collect()
}

#[test]
fn test_module_classes_rank_first_and_vendor_last() {
    let host = host();
    let document = "operations:\n    first:\n        entity: Post\n";

    let ranked = fqns(&host, document, &["operations", "first", "entity"]);
    assert_eq!(
        ranked,
        vec!["Acme\\DemoBundle\\Entity\\Post", "Other\\Bundle\\Entity\\Post", "Vendor\\Lib\\Entity\\Post"]
    );
}

#[test]
fn test_ignored_namespaces_are_not_offered() {
    let host = host();
    let document = "operations:\n    first:\n        entity: Post\n";

    let ranked = fqns(&host, document, &["operations", "first", "entity"]);
    assert!(ranked.iter().all(|fqn| !fqn.contains("\\Tests\\")));
}

#[test]
fn test_shortcut_completion_and_resolution() {
    let host = host();
    let document = "operations:\n    first:\n        class: Foo:Baz\n    second:\n        class: AppFoo:BarController\n";
    let tree = parse_document(ACTIONS, document).unwrap();
    let analysis = host.analysis();

    let first = tree.node_at(&["operations", "first", "class"]).unwrap();
    let labels: Vec<_> = analysis.completions(&tree, first).into_iter().map(|item| item.label.to_string()).collect();
    assert_eq!(labels, vec!["BazController"]);

    let second = tree.node_at(&["operations", "second", "class"]).unwrap();
    let resolved = analysis.resolve(&tree, second);
    assert_eq!(resolved.len(), 1);
    assert_eq!(
        resolved[0].target().map(Target::display_name).as_deref(),
        Some("App\\Foo\\BarController")
    );
}

#[test]
fn test_doctrine_shortcut_variants_carry_fqn() {
    let host = host();
    let document = "operations:\n    first:\n        shortcut: Po\n";
    let tree = parse_document(ACTIONS, document).unwrap();
    let node = tree.node_at(&["operations", "first", "shortcut"]).unwrap();

    let items = host.analysis().completions(&tree, node);
    let first = &items[0];
    assert_eq!(first.kind, CompletionKind::Entity);
    assert_eq!(first.label.as_ref(), "AcmeDemoBundle:Post");
    assert_eq!(first.detail.as_deref(), Some("Acme\\DemoBundle\\Entity\\Post"));
}

#[test]
fn test_accepted_doctrine_shortcuts_resolve() {
    let mut host = host();
    host.set_classes(
        "/p/src/Acme/DemoBundle/Entity/Sub/PostPart.php",
        vec![ClassEntity::new("Acme\\DemoBundle\\Entity\\Sub\\PostPart")],
    );
    let document = "operations:\n    first:\n        shortcut: Po\n";
    let tree = parse_document(ACTIONS, document).unwrap();
    let node = tree.node_at(&["operations", "first", "shortcut"]).unwrap();
    let analysis = host.analysis();

    let items = analysis.completions(&tree, node);
    assert!(items.iter().any(|item| item.label.as_ref() == "AcmeDemoBundle:Sub\\PostPart"));
    for item in &items {
        let accepted = format!("operations:\n    first:\n        shortcut: '{}'\n", item.label);
        let tree = parse_document(ACTIONS, &accepted).unwrap();
        let node = tree.node_at(&["operations", "first", "shortcut"]).unwrap();

        let resolved = analysis.resolve(&tree, node);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].target().map(Target::display_name).as_deref(), item.detail.as_deref());
    }
}

#[test]
fn test_unknown_class_is_not_found() {
    let host = host();
    let document = "operations:\n    first:\n        class: Acme\\Missing\n";
    let tree = parse_document(ACTIONS, document).unwrap();
    let node = tree.node_at(&["operations", "first", "class"]).unwrap();

    assert_eq!(host.analysis().resolve(&tree, node), vec![ResolveResult::NotFound]);
}

#[derive(Debug)]
struct ClassSuffix;

impl InsertHandler for ClassSuffix {
    fn handle_insert(&self, ctx: &mut InsertionContext, _variant: &Variant) {
        ctx.append("::class");
    }
}

#[test]
fn test_custom_insert_handler_runs_after_fqn() {
    let mut host = host();
    host.add_schema(
        Schema::new(
            "routing.yml",
            Element::map([Property::named("controller", Element::scalar(Scalar::PhpClass(PhpClass::any())))]),
        ),
        Some(Arc::new(ClassSuffix)),
    );
    let path = "/p/src/App/Resources/config/routing.yml";
    let tree = parse_document(path, "controller: BazCon\n").unwrap();
    let node = tree.node_at(&["controller"]).unwrap();

    let items = host.analysis().completions(&tree, node);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].apply("controller: BazCon", 12..18), "controller: App\\Foo\\BazController::class");
}

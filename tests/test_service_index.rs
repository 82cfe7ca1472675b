//! Service index behaviour through the analysis host.
//!
//! Covers XML/YAML parity, re-index isolation, parameter indirection, API
//! form types and workflow scopes.

use symfref::AnalysisHost;
use symfref::settings::Settings;
use symfref::symbols::{ClassEntity, FieldEntity, MethodEntity, ReturnExpr};

const SERVICES_YML: &str = r#"
parameters:
    acme.mailer.class: Acme\DemoBundle\Mailer
services:
    acme.mailer:
        class: '%acme.mailer.class%'
        tags:
            - { name: form.type, alias: 'choice|text' }
    acme.custom_type:
        class: Acme\DemoBundle\Form\CustomType
        tags:
            - { name: form.type, alias: custom }
            - { name: oro.api.form.type, alias: custom_api_type }
"#;

const SERVICES_XML: &str = r#"<?xml version="1.0" ?>
<container xmlns="http://symfony.com/schema/dic/services">
    <parameters>
        <parameter key="acme.mailer.class">Acme\DemoBundle\Mailer</parameter>
    </parameters>
    <services>
        <service id="acme.mailer" class="%acme.mailer.class%">
            <tag name="form.type" alias="choice|text"/>
        </service>
        <service id="acme.custom_type" class="Acme\DemoBundle\Form\CustomType">
            <tag name="form.type" alias="custom"/>
            <tag name="oro.api.form.type" alias="custom_api_type"/>
        </service>
    </services>
</container>"#;

const API_YML: &str = "oro_api:\n    form_types:\n        - form.type.choice\n        - form.type.date\n";

#[test]
fn test_xml_and_yaml_documents_agree() {
    let mut yaml_host = AnalysisHost::new(Settings::default());
    yaml_host.set_file_content("/p/src/Acme/DemoBundle/Resources/config/services.yml", SERVICES_YML);
    let mut xml_host = AnalysisHost::new(Settings::default());
    xml_host.set_file_content("/p/src/Acme/DemoBundle/Resources/config/services.xml", SERVICES_XML);

    let yaml = yaml_host.analysis();
    let xml = xml_host.analysis();
    assert_eq!(yaml.query().service_ids(), xml.query().service_ids());
    for id in ["acme.mailer", "acme.custom_type"] {
        assert_eq!(yaml.query().find_service(id), xml.query().find_service(id));
        assert_eq!(yaml.query().service_class(id), xml.query().service_class(id));
    }
}

#[test]
fn test_parameter_hop_resolves_class() {
    let mut host = AnalysisHost::new(Settings::default());
    host.set_file_content("/p/config/services.yml", SERVICES_YML);

    let analysis = host.analysis();
    let query = analysis.query();
    let mailer = query.find_service("acme.mailer").unwrap();
    assert_eq!(query.class_name_of(mailer), Some("Acme\\DemoBundle\\Mailer"));
    assert_eq!(query.service_class("acme.custom_type"), Some("Acme\\DemoBundle\\Form\\CustomType"));
    assert_eq!(query.service_class("acme.missing"), None);
}

#[test]
fn test_reindexing_one_document_keeps_the_others() {
    let mut host = AnalysisHost::new(Settings::default());
    host.set_file_content("/p/a/services.yml", "services:\n    acme.first:\n        class: Acme\\First\n");
    host.set_file_content("/p/b/services.yml", "services:\n    acme.second:\n        class: Acme\\Second\n");

    host.set_file_content("/p/a/services.yml", "services:\n    acme.third:\n        class: Acme\\Third\n");

    let analysis = host.analysis();
    let ids: Vec<_> = analysis.query().service_ids().into_iter().collect();
    assert_eq!(ids, vec!["acme.third", "acme.second"]);
}

#[test]
fn test_malformed_document_contributes_nothing() {
    let mut host = AnalysisHost::new(Settings::default());
    host.set_file_content("/p/a/services.yml", "services:\n    acme.first:\n        class: Acme\\First\n");
    host.set_file_content("/p/b/services.yml", "services: [unclosed\n");

    let analysis = host.analysis();
    assert!(analysis.query().find_service("acme.first").is_some());
    assert_eq!(analysis.query().service_ids().len(), 1);
}

#[test]
fn test_disabled_settings_index_nothing() {
    let mut host = AnalysisHost::new(Settings::disabled());
    host.set_file_content("/p/config/services.yml", SERVICES_YML);

    assert!(host.analysis().query().service_ids().is_empty());
}

#[test]
fn test_api_form_types() {
    let mut host = AnalysisHost::new(Settings::default());
    host.load_documents([
        ("/p/config/services.yml", SERVICES_YML),
        ("/p/src/Acme/DemoBundle/Resources/config/oro/api.yml", API_YML),
    ]);

    let analysis = host.analysis();
    let mut types: Vec<_> = analysis.api_form_types().into_iter().collect();
    types.sort_unstable();
    assert_eq!(types, vec!["choice", "custom_api_type"]);
}

#[test]
fn test_workflow_scopes() {
    let mut host = AnalysisHost::new(Settings::default());
    host.set_file_content(
        "/p/config/services.yml",
        r#"
services:
    acme.scope.step:
        class: Acme\Scope\StepProvider
        tags:
            - { name: oro_scope.provider, scopeType: workflow_definition }
    acme.scope.other:
        class: Acme\Scope\OtherProvider
        tags:
            - { name: oro_scope.provider, scopeType: workflow_definition }
    acme.scope.unrelated:
        class: Acme\Scope\UnrelatedProvider
        tags:
            - { name: oro_scope.provider, scopeType: web_content }
"#,
    );
    host.set_classes(
        "/p/src/Acme/Scope/StepProvider.php",
        vec![ClassEntity::new("Acme\\Scope\\StepProvider").with_method(
            MethodEntity::instance("getCriteriaField").returning(ReturnExpr::Literal("'stepName'".into())),
        )],
    );
    host.set_classes(
        "/p/src/Acme/Scope/OtherProvider.php",
        vec![ClassEntity::new("Acme\\Scope\\OtherProvider")
            .with_field(FieldEntity::constant("FIELD", "'otherField'"))
            .with_method(
                MethodEntity::instance("getCriteriaField")
                    .returning(ReturnExpr::ClassConstant { class: None, name: "FIELD".into() }),
            )],
    );
    host.set_classes(
        "/p/src/Acme/Scope/UnrelatedProvider.php",
        vec![ClassEntity::new("Acme\\Scope\\UnrelatedProvider").with_method(
            MethodEntity::instance("getCriteriaField").returning(ReturnExpr::Literal("'unrelated'".into())),
        )],
    );

    let scopes = host.analysis().workflow_scopes();
    let names: Vec<_> = scopes.iter().map(|scope| scope.name.as_str()).collect();
    assert_eq!(names, vec!["stepName", "otherField"]);
    assert_eq!(scopes[0].service_id.as_ref(), "acme.scope.step");
}

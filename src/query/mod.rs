//! Typed queries over a service index [`Snapshot`].
//!
//! Everything here is read-only and returns `Option` or an empty collection
//! when nothing matches; a dangling service or parameter reference is a
//! normal outcome, not a fault. Indirection is resolved with small
//! composable lookups:
//!
//! ```text
//! service id ─find_service→ Service ─class_name_of→ literal class
//!                                    └─(parameter)─value_for_parameter→ class
//! ```

mod workflow;

use indexmap::IndexSet;

use crate::index::Snapshot;
use crate::model::{Service, ServiceClassName, TagTaxonomy};

pub use workflow::{CRITERIA_FIELD_METHOD, SCOPE_PROVIDER_TAG, WORKFLOW_SCOPE_TYPE, WorkflowScope};

/// Prefix standard API form types carry in the API configuration.
pub const STANDARD_FORM_TYPE_PREFIX: &str = "form.type.";

/// Query facade borrowing one snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ServicesQuery<'s> {
    snapshot: &'s Snapshot,
}

impl<'s> ServicesQuery<'s> {
    /// Create a query over `snapshot`.
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self { snapshot }
    }

    /// The snapshot being queried.
    pub fn snapshot(&self) -> &'s Snapshot {
        self.snapshot
    }

    /// First service declared with `id`.
    pub fn find_service(&self, id: &str) -> Option<&'s Service> {
        self.snapshot.services_by_id(id).into_iter().next()
    }

    /// Every service declared with `id`, e.g. a definition and its overrides.
    pub fn services(&self, id: &str) -> Vec<&'s Service> {
        self.snapshot.services_by_id(id)
    }

    /// Distinct service ids in first-seen order.
    pub fn service_ids(&self) -> IndexSet<&'s str> {
        self.snapshot.service_ids()
    }

    /// Ids having at least one declaring service that satisfies `predicate`.
    pub fn find_services(&self, predicate: impl Fn(&Service) -> bool) -> IndexSet<&'s str> {
        self.snapshot.services().filter(|service| predicate(service)).map(|service| service.id.as_ref()).collect()
    }

    /// Value of the first declaration of parameter `name`.
    pub fn find_parameter_value(&self, name: &str) -> Option<&'s str> {
        self.snapshot.value_for_parameter(name)
    }

    /// Class implementing `service`, following at most one parameter hop.
    pub fn class_name_of(&self, service: &'s Service) -> Option<&'s str> {
        match service.class_name.as_ref()? {
            ServiceClassName::Literal(class) => Some(class.as_ref()),
            ServiceClassName::Parameter(name) => self.find_parameter_value(name),
        }
    }

    /// Class of the first service declared with `id`.
    pub fn service_class(&self, id: &str) -> Option<&'s str> {
        self.find_service(id).and_then(|service| self.class_name_of(service))
    }

    /// Every alias of every tag named `tag_name`.
    pub fn aliases_for_tag(&self, tag_name: &str) -> IndexSet<&'s str> {
        self.snapshot.aliases_for_tag(tag_name)
    }

    /// Aliases registered under one tag taxonomy.
    pub fn aliases(&self, taxonomy: TagTaxonomy) -> IndexSet<&'s str> {
        self.aliases_for_tag(taxonomy.tag_name())
    }

    /// Form types usable in API configuration.
    ///
    /// Union of the declared form types promoted to API use by the standard
    /// type list (compared without the `form.type.` prefix) and the aliases
    /// tagged explicitly as API form types.
    pub fn api_form_types(&self) -> IndexSet<&'s str> {
        let standard: IndexSet<&str> = self
            .snapshot
            .standard_api_form_types()
            .into_iter()
            .map(|t| t.strip_prefix(STANDARD_FORM_TYPE_PREFIX).unwrap_or(t))
            .collect();

        let promoted = self.aliases(TagTaxonomy::FormType).into_iter().filter(|alias| standard.contains(alias));
        promoted.chain(self.aliases(TagTaxonomy::ApiFormType)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::index::Contribution;
    use crate::model::Tag;
    use std::sync::Arc;

    fn snapshot() -> Snapshot {
        let mut first = Contribution::default();
        first.add_service(Service::new("acme.direct").with_class(ServiceClassName::Literal(Arc::from("Acme\\Direct"))));
        first.add_service(
            Service::new("acme.indirect").with_class(ServiceClassName::Parameter(Arc::from("acme.indirect.class"))),
        );
        first.add_service(
            Service::new("acme.dangling").with_class(ServiceClassName::Parameter(Arc::from("missing.class"))),
        );
        first.add_service(Service::new("acme.no_class"));
        first.parameters.insert(Arc::from("acme.indirect.class"), Arc::from("Acme\\Indirect"));

        let mut second = Contribution::default();
        second.add_service(
            Service::new("acme.direct").with_class(ServiceClassName::Literal(Arc::from("Acme\\Override"))),
        );
        second.add_service(Service::new("acme.condition").with_tag(Tag::new("oro_action.condition").with_alias("empty|blank")));

        Snapshot::from_contributions([(FileId::new(0), first), (FileId::new(1), second)])
    }

    #[test]
    fn test_class_name_of() {
        let snapshot = snapshot();
        let query = ServicesQuery::new(&snapshot);

        assert_eq!(query.service_class("acme.direct"), Some("Acme\\Direct"));
        assert_eq!(query.service_class("acme.indirect"), Some("Acme\\Indirect"));
        assert_eq!(query.service_class("acme.dangling"), None);
        assert_eq!(query.service_class("acme.no_class"), None);
        assert_eq!(query.service_class("acme.unknown"), None);
    }

    #[test]
    fn test_all_declarations_are_returned() {
        let snapshot = snapshot();
        let query = ServicesQuery::new(&snapshot);

        let classes: Vec<_> =
            query.services("acme.direct").into_iter().filter_map(|s| query.class_name_of(s)).collect();
        assert_eq!(classes, vec!["Acme\\Direct", "Acme\\Override"]);
    }

    #[test]
    fn test_find_services_and_aliases() {
        let snapshot = snapshot();
        let query = ServicesQuery::new(&snapshot);

        let tagged = query.find_services(|s| s.has_tag("oro_action.condition"));
        assert_eq!(tagged.into_iter().collect::<Vec<_>>(), vec!["acme.condition"]);

        let aliases = query.aliases(TagTaxonomy::Condition);
        assert_eq!(aliases.len(), 2);
        assert!(aliases.contains("empty") && aliases.contains("blank"));
        assert!(query.aliases(TagTaxonomy::Action).is_empty());
    }

    #[test]
    fn test_api_form_types() {
        let mut api = Contribution::default();
        api.standard_api_form_types = vec![Arc::from("form.type.choice"), Arc::from("form.type.text")];

        let mut forms = Contribution::default();
        forms.add_service(Service::new("form.choice").with_tag(Tag::new("form.type").with_alias("choice")));
        forms.add_service(Service::new("form.entity").with_tag(Tag::new("form.type").with_alias("entity")));
        forms.add_service(
            Service::new("api.custom").with_tag(Tag::new("oro.api.form.type").with_alias("custom_api_type")),
        );

        let snapshot = Snapshot::from_contributions([(FileId::new(0), api), (FileId::new(1), forms)]);
        let types = ServicesQuery::new(&snapshot).api_form_types();

        let expected: IndexSet<&str> = ["choice", "custom_api_type"].into_iter().collect();
        assert_eq!(types, expected);
    }
}

//! Workflow scopes contributed by scope-provider services.

use std::sync::Arc;

use crate::symbols::{ClassEntity, SymbolTable};

use super::ServicesQuery;

pub const SCOPE_PROVIDER_TAG: &str = "oro_scope.provider";
pub const WORKFLOW_SCOPE_TYPE: &str = "workflow_definition";
pub const CRITERIA_FIELD_METHOD: &str = "getCriteriaField";

const SCOPE_TYPE_ATTRIBUTE: &str = "scopeType";

/// A scope name a workflow definition may restrict itself to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowScope {
    pub name: String,
    pub service_id: Arc<str>,
    pub class: Arc<ClassEntity>,
}

impl ServicesQuery<'_> {
    /// Scopes declared by workflow-definition scope providers.
    ///
    /// The scope name is the literal the provider's `getCriteriaField`
    /// returns. Providers whose class, method or literal cannot be found
    /// contribute nothing.
    pub fn workflow_scopes(&self, symbols: &dyn SymbolTable) -> Vec<WorkflowScope> {
        let mut scopes = Vec::new();
        for service in self.snapshot().services() {
            let is_provider = service
                .tags_named(SCOPE_PROVIDER_TAG)
                .any(|tag| tag.get(SCOPE_TYPE_ATTRIBUTE) == Some(WORKFLOW_SCOPE_TYPE));
            if !is_provider {
                continue;
            }
            let Some(class_name) = self.class_name_of(service) else {
                continue;
            };
            for class in symbols.classes_by_fqn(class_name) {
                if let Some(name) = criteria_field(symbols, &class) {
                    scopes.push(WorkflowScope { name, service_id: service.id.clone(), class });
                }
            }
        }
        scopes
    }
}

fn criteria_field(symbols: &dyn SymbolTable, class: &ClassEntity) -> Option<String> {
    class.method(CRITERIA_FIELD_METHOD)?.returns.iter().find_map(|expr| symbols.resolve_return(class, expr))
}

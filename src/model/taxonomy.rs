//! The tag families that name things users type in configuration.

/// A tag whose aliases are the valid values of some configuration key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagTaxonomy {
    /// Condition names usable in action and workflow definitions.
    Condition,
    /// Action names usable in action and workflow definitions.
    Action,
    /// Datagrid mass-action providers.
    MassActionProvider,
    /// Form types.
    FormType,
    /// Form types registered only for the API layer.
    ApiFormType,
}

impl TagTaxonomy {
    pub const ALL: [TagTaxonomy; 5] = [
        TagTaxonomy::Condition,
        TagTaxonomy::Action,
        TagTaxonomy::MassActionProvider,
        TagTaxonomy::FormType,
        TagTaxonomy::ApiFormType,
    ];

    /// The tag name services carry to join this taxonomy.
    pub fn tag_name(self) -> &'static str {
        match self {
            TagTaxonomy::Condition => "oro_action.condition",
            TagTaxonomy::Action => "oro_action.action",
            TagTaxonomy::MassActionProvider => "oro_action.datagrid.mass_action_provider",
            TagTaxonomy::FormType => "form.type",
            TagTaxonomy::ApiFormType => "oro.api.form.type",
        }
    }

    /// Taxonomy entry for a container tag name.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|taxonomy| taxonomy.tag_name() == name)
    }
}

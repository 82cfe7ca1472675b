//! Project settings: the enablement gate and resolver tunables.

use serde::Deserialize;

/// Per-project settings.
///
/// Every field has a default, so a settings document only needs the keys it
/// overrides:
///
/// ```yaml
/// enabled: false
/// ignored_namespaces: ['\Tests\']
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global kill-switch. When false every indexer contributes nothing.
    pub enabled: bool,
    /// Path fragment identifying third-party code.
    pub vendor_marker: String,
    /// Path segment where a module's own sources end and its resources begin.
    pub module_root_marker: String,
    /// Namespace fragments never offered as class completions.
    pub ignored_namespaces: Vec<String>,
    /// Marker the editor inserts at the caret while computing completions.
    pub placeholder_marker: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            vendor_marker: "/vendor/".to_string(),
            module_root_marker: "/Resources/".to_string(),
            ignored_namespaces: vec![
                "\\__CG__\\".to_string(),
                "\\Tests\\".to_string(),
                "\\Repository\\".to_string(),
            ],
            placeholder_marker: "IntellijIdeaRulezzz".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Settings with the enablement gate switched off.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    /// Whether classes in `namespace` are never offered.
    pub fn is_ignored_namespace(&self, namespace: &str) -> bool {
        self.ignored_namespaces.iter().any(|ignored| namespace.contains(ignored.as_str()))
    }
}

//! Capture patterns: which document nodes a schema position matches.

use std::fmt;
use std::sync::Arc;

use crate::document::{DocumentTree, NodeId, NodeKind};

/// One step from a node to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Keyed child with exactly this key.
    Key(Arc<str>),
    /// Keyed child with any key.
    AnyKey,
    /// Child of a sequence.
    Item,
}

impl Step {
    fn accepts(&self, tree: &dyn DocumentTree, node: NodeId) -> bool {
        let is_item = tree.parent(node).is_some_and(|parent| tree.kind(parent) == NodeKind::Sequence);
        match self {
            Step::Item => is_item,
            Step::AnyKey => !is_item && tree.key(node).is_some(),
            Step::Key(key) => !is_item && tree.key(node) == Some(key.as_ref()),
        }
    }
}

/// A root-anchored path of steps.
///
/// Captures are built compositionally while walking a schema: the capture of
/// a child is the parent's capture plus one step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capture {
    steps: Vec<Step>,
}

impl Capture {
    /// The capture matching the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// The steps from the document root.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Extend with a named key step.
    pub fn key(&self, key: &str) -> Self {
        self.push(Step::Key(Arc::from(key)))
    }

    /// Extend with a wildcard key step.
    pub fn any_key(&self) -> Self {
        self.push(Step::AnyKey)
    }

    /// Extend with a sequence item step.
    pub fn item(&self) -> Self {
        self.push(Step::Item)
    }

    fn push(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Whether `node` sits exactly at this capture.
    pub fn matches(&self, tree: &dyn DocumentTree, node: NodeId) -> bool {
        let mut current = node;
        for step in self.steps.iter().rev() {
            if !step.accepts(tree, current) {
                return false;
            }
            match tree.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        Some(current) == tree.root()
    }

    /// Every node of `tree` at this capture, in document order.
    pub fn find_all(&self, tree: &dyn DocumentTree) -> Vec<NodeId> {
        let Some(root) = tree.root() else {
            return Vec::new();
        };
        self.steps.iter().fold(vec![root], |nodes, step| {
            nodes
                .into_iter()
                .flat_map(|node| tree.children(node).iter().copied().filter(|&c| step.accepts(tree, c)).collect::<Vec<_>>())
                .collect()
        })
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.steps {
            match step {
                Step::Key(key) => write!(f, ".{key}")?,
                Step::AnyKey => f.write_str(".*")?,
                Step::Item => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{xml, yaml};

    const ACTIONS: &str = "\
operations:
    first:
        label: First
        preconditions:
            - '@is_granted'
            - '@not_blank'
    second:
        label: Second
";

    #[test]
    fn test_matches_wildcard_keys() {
        let tree = yaml::parse("/actions.yml", ACTIONS).unwrap();
        let capture = Capture::root().key("operations").any_key().key("label");

        let first = tree.node_at(&["operations", "first", "label"]).unwrap();
        assert!(capture.matches(&tree, first));
        assert!(!capture.matches(&tree, tree.node_at(&["operations", "first"]).unwrap()));
        assert_eq!(capture.find_all(&tree).len(), 2);
    }

    #[test]
    fn test_sequence_items() {
        let tree = yaml::parse("/actions.yml", ACTIONS).unwrap();
        let capture = Capture::root().key("operations").any_key().key("preconditions").item();

        let texts: Vec<_> = capture.find_all(&tree).into_iter().filter_map(|n| tree.text(n)).collect();
        assert_eq!(texts, vec!["@is_granted", "@not_blank"]);
        // items are not keyed children
        assert!(Capture::root().key("operations").any_key().key("preconditions").any_key().find_all(&tree).is_empty());
    }

    #[test]
    fn test_repeated_xml_elements() {
        let text = r#"<container><services><service id="a"/><service id="b"/></services></container>"#;
        let tree = xml::parse("/services.xml", text).unwrap();
        let ids = Capture::root().key("container").key("services").key("service").key("id");

        let found: Vec<_> = ids.find_all(&tree).into_iter().filter_map(|n| tree.text(n)).collect();
        assert_eq!(found, vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        let capture = Capture::root().key("operations").any_key().item();
        assert_eq!(capture.to_string(), "$.operations.*[]");
        assert_eq!(capture.depth(), 3);
    }
}

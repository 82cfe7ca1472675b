//! YAML → [`DocTree`].

use serde_yaml::Value;

use super::{DocTree, DocumentError, NodeId, NodeKind};

/// Parse YAML text. An empty document yields a tree with a single empty
/// mapping root.
pub fn parse(path: &str, text: &str) -> Result<DocTree, DocumentError> {
    let value: Value = if text.trim().is_empty() {
        Value::Mapping(Default::default())
    } else {
        serde_yaml::from_str(text)?
    };

    let mut tree = DocTree::new(path);
    add_value(&mut tree, None, None, &value);
    Ok(tree)
}

fn add_value(tree: &mut DocTree, parent: Option<NodeId>, key: Option<&str>, value: &Value) {
    match value {
        Value::Mapping(mapping) => {
            let node = tree.add(parent, NodeKind::Mapping, key, None);
            for (k, v) in mapping {
                // non-scalar keys are never meaningful in container config
                if let Some(k) = scalar_text(k) {
                    add_value(tree, Some(node), Some(&k), v);
                }
            }
        }
        Value::Sequence(items) => {
            let node = tree.add(parent, NodeKind::Sequence, key, None);
            for item in items {
                add_value(tree, Some(node), None, item);
            }
        }
        Value::Tagged(tagged) => add_value(tree, parent, key, &tagged.value),
        scalar => {
            let text = scalar_text(scalar);
            tree.add(parent, NodeKind::Scalar, key, text.as_deref());
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Mapping(_) | Value::Sequence(_) => None,
    }
}

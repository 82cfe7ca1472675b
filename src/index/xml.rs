//! Service extraction from XML container configuration.

use std::sync::Arc;

use crate::document::{DocumentTree, NodeId};
use crate::model::{Service, ServiceClassName, Tag};

use super::{Contribution, ServiceIndexer};

#[derive(Clone, Copy, Debug, Default)]
pub struct XmlServiceIndexer;

impl ServiceIndexer for XmlServiceIndexer {
    fn index(&self, tree: &dyn DocumentTree) -> Contribution {
        let mut contribution = Contribution::default();
        let Some(container) = tree.node_at(&["container"]) else {
            return contribution;
        };

        for parameters in tree.children_named(container, "parameters") {
            for parameter in tree.children_named(parameters, "parameter") {
                // collection parameters nest further <parameter> elements
                if tree.child(parameter, "parameter").is_some() {
                    continue;
                }
                if let (Some(key), Some(value)) = (tree.child_text(parameter, "key"), tree.text(parameter)) {
                    contribution.parameters.insert(Arc::from(key), Arc::from(value));
                }
            }
        }

        for services in tree.children_named(container, "services") {
            for declaration in tree.children_named(services, "service") {
                if let Some(service) = service(tree, declaration) {
                    contribution.add_service(service);
                }
            }
        }

        contribution
    }
}

fn service(tree: &dyn DocumentTree, node: NodeId) -> Option<Service> {
    let id = tree.child_text(node, "id")?;
    let class_name = match tree.child_text(node, "class") {
        Some(class) => ServiceClassName::parse(class),
        None if id.contains('\\') => ServiceClassName::parse(id),
        None => None,
    };

    let tags = tree
        .children_named(node, "tag")
        .into_iter()
        .filter_map(|tag_node| {
            let mut tag = Tag::new(tree.child_text(tag_node, "name")?);
            for &attribute in tree.children(tag_node) {
                let (Some(key), Some(value)) = (tree.key(attribute), tree.text(attribute)) else {
                    continue;
                };
                if key == "name" {
                    continue;
                }
                if key == "alias" {
                    tag.alias = Some(Arc::from(value));
                }
                tag = tag.with_attribute(key, value);
            }
            Some(tag)
        })
        .collect();

    Some(Service { id: Arc::from(id), class_name, tags })
}

//! Service extraction from YAML container configuration.
//!
//! ```yaml
//! parameters:
//!     acme.foo.class: Acme\Foo
//! services:
//!     acme.foo:
//!         class: '%acme.foo.class%'
//!         tags:
//!             - { name: form.type, alias: foo }
//!             - kernel.event_subscriber
//!     Acme\Bar: ~
//! oro_api:
//!     form_types:
//!         - form.type.text
//! ```

use std::sync::Arc;

use crate::document::{DocumentTree, NodeId, NodeKind};
use crate::model::{Service, ServiceClassName, Tag};

use super::{Contribution, ServiceIndexer};

#[derive(Clone, Copy, Debug, Default)]
pub struct YamlServiceIndexer;

impl ServiceIndexer for YamlServiceIndexer {
    fn index(&self, tree: &dyn DocumentTree) -> Contribution {
        let mut contribution = Contribution::default();
        let Some(root) = tree.root() else {
            return contribution;
        };

        if let Some(parameters) = tree.child(root, "parameters") {
            for &parameter in tree.children(parameters) {
                if tree.kind(parameter) != NodeKind::Scalar {
                    continue;
                }
                if let (Some(name), Some(value)) = (tree.key(parameter), tree.text(parameter)) {
                    contribution.parameters.insert(Arc::from(name), Arc::from(value));
                }
            }
        }

        if let Some(services) = tree.child(root, "services") {
            for &declaration in tree.children(services) {
                if let Some(service) = service(tree, declaration) {
                    contribution.add_service(service);
                }
            }
        }

        if let Some(form_types) = tree.node_at(&["oro_api", "form_types"]) {
            contribution.standard_api_form_types.extend(
                tree.children(form_types).iter().filter_map(|&t| tree.text(t)).map(Arc::from),
            );
        }

        contribution
    }
}

fn service(tree: &dyn DocumentTree, node: NodeId) -> Option<Service> {
    let id = tree.key(node)?;
    // `_defaults` and `_instanceof` configure other services
    if id.starts_with('_') {
        return None;
    }

    let mut service = Service::new(id);
    let implicit_class = || id.contains('\\').then(|| ServiceClassName::parse(id)).flatten();

    match tree.kind(node) {
        NodeKind::Scalar => {
            // `id: '@other'` is an alias, not a declaration
            if tree.text(node).is_some_and(|text| text.starts_with('@')) {
                return None;
            }
            service.class_name = implicit_class();
        }
        NodeKind::Mapping => {
            service.class_name =
                tree.child_text(node, "class").and_then(ServiceClassName::parse).or_else(implicit_class);
            if let Some(tags) = tree.child(node, "tags") {
                service.tags = tree.children(tags).iter().filter_map(|&t| tag(tree, t)).collect();
            }
        }
        NodeKind::Sequence => return None,
    }

    Some(service)
}

fn tag(tree: &dyn DocumentTree, node: NodeId) -> Option<Tag> {
    match tree.kind(node) {
        NodeKind::Scalar => tree.text(node).map(Tag::new),
        NodeKind::Mapping => {
            let mut tag = Tag::new(tree.child_text(node, "name")?);
            for &attribute in tree.children(node) {
                let (Some(key), Some(value)) = (tree.key(attribute), tree.text(attribute)) else {
                    continue;
                };
                match key {
                    "name" => {}
                    "alias" => {
                        tag.alias = Some(Arc::from(value));
                        tag = tag.with_attribute(key, value);
                    }
                    _ => tag = tag.with_attribute(key, value),
                }
            }
            Some(tag)
        }
        NodeKind::Sequence => None,
    }
}

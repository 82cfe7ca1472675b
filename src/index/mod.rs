//! Service index: per-document contributions merged into snapshots.
//!
//! # Architecture
//!
//! 1. **Indexers** ([`YamlServiceIndexer`], [`XmlServiceIndexer`]) turn one
//!    document tree into a [`Contribution`]: services, parameters and
//!    standard API form types. They never fail; odd shapes are skipped.
//! 2. **Generations** - [`ServiceIndex`] keeps one contribution per
//!    [`FileId`](crate::base::FileId). Re-indexing a document swaps its
//!    generation in a single write; nothing else is touched.
//! 3. **Snapshots** - queries run against a [`Snapshot`], an immutable list
//!    of the live generations in index order.

mod services;
mod store;
mod xml;
mod yaml;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentFormat, DocumentTree};
use crate::model::Service;

pub use services::{LoadOutcome, ServiceIndex, Snapshot};
pub use store::{IndexStore, MemoryIndexStore};
pub use xml::XmlServiceIndexer;
pub use yaml::YamlServiceIndexer;

/// Version of the derivation logic. Bump it whenever indexers change what
/// they extract; stores written with another version are rebuilt.
pub const INDEX_VERSION: u32 = 2;

/// Everything one document contributes to the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Services keyed by id. Ids are unique within one document.
    pub services: IndexMap<Arc<str>, Service>,
    /// Container parameters declared by the document.
    pub parameters: IndexMap<Arc<str>, Arc<str>>,
    /// Form types the API layer accepts out of the box (`form.type.*`).
    pub standard_api_form_types: Vec<Arc<str>>,
}

impl Contribution {
    /// Check if the document contributes nothing.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.parameters.is_empty()
            && self.standard_api_form_types.is_empty()
    }

    /// Add a service; a later declaration of the same id wins.
    pub fn add_service(&mut self, service: Service) {
        self.services.insert(service.id.clone(), service);
    }
}

/// Extracts a [`Contribution`] from one document tree.
pub trait ServiceIndexer: Send + Sync {
    fn index(&self, tree: &dyn DocumentTree) -> Contribution;
}

/// The indexer responsible for a document format.
pub fn indexer_for(format: DocumentFormat) -> &'static dyn ServiceIndexer {
    match format {
        DocumentFormat::Xml => &XmlServiceIndexer,
        DocumentFormat::Yaml => &YamlServiceIndexer,
    }
}

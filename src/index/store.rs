//! Persistence collaborator for the service index.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::FileId;

use super::Contribution;

/// A versioned, document-keyed store backing a [`ServiceIndex`](super::ServiceIndex).
///
/// The index writes every generation through to the store and restores from
/// it on start-up, as long as the stored version matches
/// [`INDEX_VERSION`](super::INDEX_VERSION).
pub trait IndexStore: Send + Sync {
    /// Version the stored entries were derived with.
    fn version(&self) -> u32;

    fn save(&self, file: FileId, path: &str, contribution: &Contribution);

    fn remove(&self, file: FileId);

    /// All stored generations in insertion order.
    fn entries(&self) -> Vec<(FileId, Arc<str>, Contribution)>;

    /// Drop everything and start over at `version`.
    fn reset(&self, version: u32);
}

/// Process-local [`IndexStore`].
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    version: u32,
    entries: IndexMap<FileId, (Arc<str>, Contribution)>,
}

impl MemoryIndexStore {
    /// Create an empty store at `version`.
    pub fn new(version: u32) -> Self {
        Self { inner: RwLock::new(MemoryStoreInner { version, entries: IndexMap::new() }) }
    }

    /// Number of stored generations.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexStore for MemoryIndexStore {
    fn version(&self) -> u32 {
        self.inner.read().version
    }

    fn save(&self, file: FileId, path: &str, contribution: &Contribution) {
        self.inner.write().entries.insert(file, (Arc::from(path), contribution.clone()));
    }

    fn remove(&self, file: FileId) {
        self.inner.write().entries.shift_remove(&file);
    }

    fn entries(&self) -> Vec<(FileId, Arc<str>, Contribution)> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(&file, (path, contribution))| (file, path.clone(), contribution.clone()))
            .collect()
    }

    fn reset(&self, version: u32) {
        let mut inner = self.inner.write();
        inner.version = version;
        inner.entries.clear();
    }
}

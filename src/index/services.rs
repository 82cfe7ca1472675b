//! Generation-per-document service index and its read-only snapshots.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::base::FileId;
use crate::document::{self, DocumentFormat, DocumentTree};
use crate::model::Service;
use crate::settings::Settings;

use super::{Contribution, INDEX_VERSION, IndexStore, indexer_for};

#[derive(Clone, Debug)]
struct Generation {
    path: Arc<str>,
    contribution: Arc<Contribution>,
}

/// Result of restoring an index from its store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This many generations were restored.
    Restored(usize),
    /// The store was written by another derivation version and was reset;
    /// every document must be indexed again.
    RebuildRequired { stored_version: u32 },
}

/// The merged, incrementally maintained service index of one project.
///
/// Each document owns one generation. [`put`](Self::put) computes the new
/// contribution without holding the lock and then replaces the generation in
/// one write, so concurrent readers see either the old or the new
/// contribution, never a mix.
pub struct ServiceIndex {
    settings: Arc<Settings>,
    generations: RwLock<IndexMap<FileId, Generation>>,
    store: Option<Box<dyn IndexStore>>,
}

impl ServiceIndex {
    /// Create an empty, non-persistent index.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings, generations: RwLock::new(IndexMap::new()), store: None }
    }

    /// Create an index backed by `store`, restoring what it holds.
    pub fn with_store(settings: Arc<Settings>, store: Box<dyn IndexStore>) -> (Self, LoadOutcome) {
        let stored_version = store.version();
        if stored_version != INDEX_VERSION {
            warn!(stored_version, current = INDEX_VERSION, "service index version changed; rebuilding");
            store.reset(INDEX_VERSION);
            let index = Self { settings, generations: RwLock::new(IndexMap::new()), store: Some(store) };
            return (index, LoadOutcome::RebuildRequired { stored_version });
        }

        let generations: IndexMap<_, _> = store
            .entries()
            .into_iter()
            .map(|(file, path, contribution)| (file, Generation { path, contribution: Arc::new(contribution) }))
            .collect();
        let restored = generations.len();
        debug!(restored, "service index restored from store");
        let index = Self { settings, generations: RwLock::new(generations), store: Some(store) };
        (index, LoadOutcome::Restored(restored))
    }

    /// Settings the index was created with.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Compute a document's contribution from its text.
    ///
    /// Parse failures are logged and yield an empty contribution, which keeps
    /// the fault local to this document.
    pub fn compute(&self, path: &str, text: &str) -> Contribution {
        if !self.settings.enabled {
            return Contribution::default();
        }
        let Some(format) = DocumentFormat::from_path(path) else {
            return Contribution::default();
        };
        match document::parse_document(path, text) {
            Ok(tree) => indexer_for(format).index(&tree),
            Err(error) => {
                warn!(path, %error, "cannot index document; it contributes no services");
                Contribution::default()
            }
        }
    }

    /// Compute a contribution from an already parsed tree.
    pub fn compute_tree(&self, tree: &dyn DocumentTree, format: DocumentFormat) -> Contribution {
        if !self.settings.enabled {
            return Contribution::default();
        }
        indexer_for(format).index(tree)
    }

    /// Index a document, replacing its previous contribution.
    /// Returns the number of services it declares.
    pub fn put(&self, file: FileId, path: &str, text: &str) -> usize {
        let contribution = self.compute(path, text);
        self.replace(file, path, contribution)
    }

    /// Index an already parsed document.
    pub fn put_tree(&self, file: FileId, tree: &dyn DocumentTree, format: DocumentFormat) -> usize {
        let contribution = self.compute_tree(tree, format);
        self.replace(file, tree.path(), contribution)
    }

    /// Index many documents, computing contributions in parallel.
    pub fn put_all<P, T>(&self, documents: &[(FileId, P, T)]) -> usize
    where
        P: AsRef<str> + Sync,
        T: AsRef<str> + Sync,
    {
        let computed: Vec<_> = documents
            .par_iter()
            .map(|(file, path, text)| (*file, path.as_ref(), self.compute(path.as_ref(), text.as_ref())))
            .collect();

        computed
            .into_iter()
            .map(|(file, path, contribution)| self.replace(file, path, contribution))
            .sum()
    }

    /// Drop a document's generation.
    pub fn remove(&self, file: FileId) {
        let mut generations = self.generations.write();
        generations.shift_remove(&file);
        if let Some(store) = &self.store {
            store.remove(file);
        }
    }

    /// The store is written under the same lock as the generation, so both
    /// always agree on a document's last contribution.
    fn replace(&self, file: FileId, path: &str, contribution: Contribution) -> usize {
        let services = contribution.services.len();
        let mut generations = self.generations.write();
        if let Some(store) = &self.store {
            store.save(file, path, &contribution);
        }
        let generation = Generation { path: Arc::from(path), contribution: Arc::new(contribution) };
        generations.insert(file, generation);
        drop(generations);
        debug!(%file, path, services, "indexed document");
        services
    }

    /// Read-only view of every live generation, in index order.
    pub fn snapshot(&self) -> Snapshot {
        let generations = self
            .generations
            .read()
            .iter()
            .map(|(&file, generation)| (file, generation.path.clone(), generation.contribution.clone()))
            .collect();
        Snapshot::new(generations)
    }

    /// The backing store, if the index is persistent.
    pub fn store(&self) -> Option<&dyn IndexStore> {
        self.store.as_deref()
    }

    /// Number of documents with a live generation.
    pub fn document_count(&self) -> usize {
        self.generations.read().len()
    }
}

impl std::fmt::Debug for ServiceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceIndex")
            .field("documents", &self.document_count())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

/// Immutable merged view of a [`ServiceIndex`].
///
/// Lookups scan generations in index order, so "first found" is well defined.
/// Service ids and document ids are mapped to their generations once, when
/// the snapshot is taken.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    generations: Vec<(FileId, Arc<str>, Arc<Contribution>)>,
    by_file: FxHashMap<FileId, usize>,
    by_service_id: IndexMap<Arc<str>, Vec<usize>>,
}

impl Snapshot {
    fn new(generations: Vec<(FileId, Arc<str>, Arc<Contribution>)>) -> Self {
        let mut by_file = FxHashMap::default();
        let mut by_service_id: IndexMap<Arc<str>, Vec<usize>> = IndexMap::new();
        for (position, (file, _, contribution)) in generations.iter().enumerate() {
            by_file.insert(*file, position);
            for id in contribution.services.keys() {
                by_service_id.entry(id.clone()).or_default().push(position);
            }
        }
        Self { generations, by_file, by_service_id }
    }

    /// Build a snapshot directly from contributions (tests, one-off tools).
    pub fn from_contributions(contributions: impl IntoIterator<Item = (FileId, Contribution)>) -> Self {
        let generations = contributions
            .into_iter()
            .map(|(file, contribution)| (file, Arc::from(""), Arc::new(contribution)))
            .collect();
        Self::new(generations)
    }

    fn contributions(&self) -> impl Iterator<Item = &Contribution> {
        self.generations.iter().map(|(_, _, contribution)| contribution.as_ref())
    }

    /// Contribution of one document, if it is indexed.
    pub fn contribution(&self, file: FileId) -> Option<&Contribution> {
        self.by_file.get(&file).map(|&position| self.generations[position].2.as_ref())
    }

    /// Indexed documents and their paths.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &str)> {
        self.generations.iter().map(|(file, path, _)| (*file, path.as_ref()))
    }

    /// Path a document was indexed under.
    pub fn path(&self, file: FileId) -> Option<&str> {
        self.by_file.get(&file).map(|&position| self.generations[position].1.as_ref())
    }

    /// Every service declared with `id`, across all documents.
    pub fn services_by_id(&self, id: &str) -> Vec<&Service> {
        self.by_service_id
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&position| self.generations[position].2.services.get(id))
            .collect()
    }

    /// Distinct service ids in first-seen order.
    pub fn service_ids(&self) -> IndexSet<&str> {
        self.by_service_id.keys().map(|id| id.as_ref()).collect()
    }

    /// Every declared service, document by document.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.contributions().flat_map(|c| c.services.values())
    }

    /// Every alias of every tag named `tag_name`, split on `|`.
    pub fn aliases_for_tag(&self, tag_name: &str) -> IndexSet<&str> {
        self.services()
            .flat_map(|service| service.tags_named(tag_name))
            .flat_map(|tag| tag.aliases())
            .collect()
    }

    /// Value of the first declaration of parameter `name`.
    pub fn value_for_parameter(&self, name: &str) -> Option<&str> {
        self.contributions().find_map(|c| c.parameters.get(name)).map(|value| value.as_ref())
    }

    /// Distinct parameter names in first-seen order.
    pub fn parameter_names(&self) -> IndexSet<&str> {
        self.contributions().flat_map(|c| c.parameters.keys().map(|k| k.as_ref())).collect()
    }

    /// Form types the API layer declares as standard.
    pub fn standard_api_form_types(&self) -> IndexSet<&str> {
        self.contributions()
            .flat_map(|c| c.standard_api_form_types.iter().map(|t| t.as_ref()))
            .collect()
    }

    /// Number of documents in the snapshot.
    pub fn document_count(&self) -> usize {
        self.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndexStore;

    fn index() -> ServiceIndex {
        ServiceIndex::new(Arc::new(Settings::default()))
    }

    const A: &str = r#"
parameters:
    shared.class: Acme\FromA
services:
    a.one:
        class: Acme\One
        tags: [{ name: form.type, alias: 'x|y' }]
"#;

    const B: &str = r#"
parameters:
    shared.class: Acme\FromB
services:
    b.one:
        class: Acme\Two
        tags: [{ name: form.type, alias: 'y|z' }]
"#;

    #[test]
    fn test_aliases_union_across_documents() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A);
        index.put(FileId::new(1), "/b.yml", B);

        let snapshot = index.snapshot();
        let aliases = snapshot.aliases_for_tag("form.type");
        assert_eq!(aliases.len(), 3);
        assert!(["x", "y", "z"].iter().all(|a| aliases.contains(a)));
        assert!(snapshot.aliases_for_tag("unknown").is_empty());
    }

    #[test]
    fn test_first_parameter_wins() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A);
        index.put(FileId::new(1), "/b.yml", B);
        assert_eq!(index.snapshot().value_for_parameter("shared.class"), Some("Acme\\FromA"));
        assert_eq!(index.snapshot().value_for_parameter("missing"), None);
    }

    #[test]
    fn test_reindex_keeps_other_documents() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A);
        index.put(FileId::new(1), "/b.yml", B);
        let before = index.snapshot().contribution(FileId::new(1)).cloned();

        index.put(FileId::new(0), "/a.yml", "services:\n    a.two:\n        class: Acme\\Three\n");

        let snapshot = index.snapshot();
        assert_eq!(snapshot.contribution(FileId::new(1)).cloned(), before);
        assert!(snapshot.services_by_id("a.one").is_empty());
        assert_eq!(snapshot.services_by_id("a.two").len(), 1);
        // replacing keeps the document's position in scan order
        assert_eq!(snapshot.value_for_parameter("shared.class"), Some("Acme\\FromB"));
    }

    #[test]
    fn test_malformed_document_is_isolated() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A);
        assert_eq!(index.put(FileId::new(1), "/broken.yml", "services: [unclosed"), 0);
        assert_eq!(index.put(FileId::new(2), "/broken.xml", "<container><services>"), 0);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.document_count(), 3);
        assert_eq!(snapshot.services_by_id("a.one").len(), 1);
    }

    #[test]
    fn test_disabled_gate_yields_empty_contributions() {
        let index = ServiceIndex::new(Arc::new(Settings::disabled()));
        assert_eq!(index.put(FileId::new(0), "/a.yml", A), 0);
        assert!(index.snapshot().service_ids().is_empty());
    }

    #[test]
    fn test_duplicate_ids_across_documents() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", "services:\n    dup:\n        class: Acme\\A\n");
        index.put(FileId::new(1), "/b.yml", "services:\n    dup:\n        class: Acme\\B\n");

        let snapshot = index.snapshot();
        assert_eq!(snapshot.services_by_id("dup").len(), 2);
        assert_eq!(snapshot.service_ids().len(), 1);
    }

    #[test]
    fn test_put_all_parallel() {
        let index = index();
        let documents = vec![(FileId::new(0), "/a.yml", A), (FileId::new(1), "/b.yml", B)];
        assert_eq!(index.put_all(&documents), 2);
        assert_eq!(index.document_count(), 2);
    }

    #[test]
    fn test_remove_document() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A);
        index.remove(FileId::new(0));
        assert!(index.snapshot().services_by_id("a.one").is_empty());
    }

    const A_FIRST: &str = "services:\n    a.one:\n        class: Acme\\One\n    a.two:\n        class: Acme\\Two\n";
    const A_SECOND: &str = "services:\n    a.three:\n        class: Acme\\Three\n    a.four:\n        class: Acme\\Four\n";

    fn ids(contribution: &Contribution) -> Vec<&str> {
        contribution.services.keys().map(|id| id.as_ref()).collect()
    }

    #[test]
    fn test_concurrent_readers_see_whole_generations() {
        let index = index();
        index.put(FileId::new(0), "/a.yml", A_FIRST);
        index.put(FileId::new(1), "/b.yml", B);
        let b_before = index.snapshot().contribution(FileId::new(1)).cloned();

        std::thread::scope(|scope| {
            for writer in 0..2 {
                let index = &index;
                scope.spawn(move || {
                    for round in 0..200 {
                        let text = if (round + writer) % 2 == 0 { A_SECOND } else { A_FIRST };
                        index.put(FileId::new(0), "/a.yml", text);
                    }
                });
            }
            for _ in 0..4 {
                let (index, b_before) = (&index, &b_before);
                scope.spawn(move || {
                    for _ in 0..200 {
                        let snapshot = index.snapshot();
                        let a = snapshot.contribution(FileId::new(0)).map(ids).unwrap_or_default();
                        assert!(
                            a == ["a.one", "a.two"] || a == ["a.three", "a.four"],
                            "mixed generation: {a:?}"
                        );
                        let one = snapshot.services_by_id("a.one").len();
                        assert_eq!(one, snapshot.services_by_id("a.two").len());
                        assert_eq!(one + snapshot.services_by_id("a.three").len(), 1);
                        assert_eq!(snapshot.contribution(FileId::new(1)).cloned(), *b_before);
                        assert_eq!(snapshot.services_by_id("b.one").len(), 1);
                    }
                });
            }
        });
    }

    #[test]
    fn test_store_agrees_with_index_after_concurrent_puts() {
        let (index, _) = ServiceIndex::with_store(
            Arc::new(Settings::default()),
            Box::new(MemoryIndexStore::new(INDEX_VERSION)),
        );

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let index = &index;
                scope.spawn(move || {
                    for round in 0..100 {
                        let text = if (round + writer) % 2 == 0 { A_SECOND } else { A_FIRST };
                        index.put(FileId::new(0), "/a.yml", text);
                    }
                });
            }
        });

        let stored = index.store().map(|store| store.entries()).unwrap_or_default();
        assert_eq!(stored.len(), 1);
        assert_eq!(Some(&stored[0].2), index.snapshot().contribution(FileId::new(0)));
    }

    #[test]
    fn test_lookups_by_file_and_id() {
        let index = index();
        index.put(FileId::new(4), "/a.yml", A);
        index.put(FileId::new(9), "/b.yml", B);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.path(FileId::new(9)), Some("/b.yml"));
        assert_eq!(snapshot.path(FileId::new(5)), None);
        assert_eq!(snapshot.contribution(FileId::new(4)).map(ids), Some(vec!["a.one"]));
        assert_eq!(snapshot.service_ids().into_iter().collect::<Vec<_>>(), vec!["a.one", "b.one"]);
        assert!(snapshot.services_by_id("missing").is_empty());
    }

    #[test]
    fn test_store_restore_and_version_bump() {
        let store = MemoryIndexStore::new(INDEX_VERSION);
        store.save(FileId::new(0), "/a.yml", &index().compute("/a.yml", A));

        let (restored, outcome) =
            ServiceIndex::with_store(Arc::new(Settings::default()), Box::new(store));
        assert_eq!(outcome, LoadOutcome::Restored(1));
        assert_eq!(restored.snapshot().services_by_id("a.one").len(), 1);

        let stale = MemoryIndexStore::new(INDEX_VERSION - 1);
        stale.save(FileId::new(0), "/a.yml", &Contribution::default());
        let (rebuilt, outcome) =
            ServiceIndex::with_store(Arc::new(Settings::default()), Box::new(stale));
        assert_eq!(outcome, LoadOutcome::RebuildRequired { stored_version: INDEX_VERSION - 1 });
        assert_eq!(rebuilt.document_count(), 0);
    }
}

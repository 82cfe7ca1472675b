//! AnalysisHost and Analysis: the entry point for editor integrations.
//!
//! `AnalysisHost` owns the mutable project state: document texts, the
//! service index, host classes and the registered schemas. `Analysis` is a
//! read-only view taken at one point in time; every query goes through it.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::base::FileId;
use crate::document::{self, DocTree, DocumentFormat, DocumentTree, NodeId, SourceRoot};
use crate::index::{ServiceIndex, Snapshot};
use crate::query::{ServicesQuery, WorkflowScope};
use crate::reference::{InsertHandler, ReferenceRegistry, ResolveCtx, ResolveResult};
use crate::schema::{ExpectedKeys, KeyVisitor, Schema};
use crate::settings::Settings;
use crate::symbols::{ClassEntity, MemorySymbolTable};

use super::completion::{self, CompletionItem};
use super::diagnostics::{Diagnostic, DiagnosticCollector, check_references};

/// A registered schema with the registry and key table derived from it.
#[derive(Debug)]
struct SchemaEntry {
    schema: Schema,
    registry: ReferenceRegistry,
    keys: ExpectedKeys,
}

/// Owns the project state and hands out [`Analysis`] snapshots.
#[derive(Debug)]
pub struct AnalysisHost {
    settings: Arc<Settings>,
    index: ServiceIndex,
    symbols: MemorySymbolTable,
    files: SourceRoot,
    texts: IndexMap<FileId, Arc<str>>,
    schemas: Vec<SchemaEntry>,
    next_file: u32,
}

impl AnalysisHost {
    /// Create a host with an empty, non-persistent index.
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let index = ServiceIndex::new(settings.clone());
        Self::with_index(settings, index)
    }

    /// Host around an existing (possibly restored) index. Restored documents
    /// are registered as known files; their ids are never reused.
    pub fn with_index(settings: Arc<Settings>, index: ServiceIndex) -> Self {
        let mut files = SourceRoot::new();
        let mut next_file = 0;
        for (file, path) in index.snapshot().files() {
            files.insert(file, path);
            next_file = next_file.max(file.index() + 1);
        }
        Self {
            settings,
            index,
            symbols: MemorySymbolTable::new(),
            files,
            texts: IndexMap::new(),
            schemas: Vec::new(),
            next_file,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the service index.
    pub fn index(&self) -> &ServiceIndex {
        &self.index
    }

    /// Get the host class table.
    pub fn symbols(&self) -> &MemorySymbolTable {
        &self.symbols
    }

    /// Get the known files.
    pub fn files(&self) -> &SourceRoot {
        &self.files
    }

    fn file_id_or_alloc(&mut self, path: &str) -> FileId {
        if let Some(file) = self.files.file_for_path(path) {
            return file;
        }
        let file = FileId::new(self.next_file);
        self.next_file += 1;
        self.files.insert(file, path);
        file
    }

    /// Register a file without content (assets, scripts, host sources).
    pub fn add_file(&mut self, path: &str) -> FileId {
        self.file_id_or_alloc(path)
    }

    /// Set a document's text. Configuration documents are re-indexed.
    pub fn set_file_content(&mut self, path: &str, text: &str) -> FileId {
        let file = self.file_id_or_alloc(path);
        self.texts.insert(file, Arc::from(text));
        if DocumentFormat::from_path(path).is_some() {
            self.index.put(file, path, text);
        }
        file
    }

    /// Set many documents at once; configuration documents are indexed in
    /// parallel.
    pub fn load_documents<P, T>(&mut self, documents: impl IntoIterator<Item = (P, T)>) -> Vec<FileId>
    where
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let mut ids = Vec::new();
        let mut indexable = Vec::new();
        for (path, text) in documents {
            let (path, text) = (path.as_ref(), text.as_ref());
            let file = self.file_id_or_alloc(path);
            self.texts.insert(file, Arc::from(text));
            if DocumentFormat::from_path(path).is_some() {
                indexable.push((file, path.to_string(), text.to_string()));
            }
            ids.push(file);
        }
        let services = self.index.put_all(&indexable);
        debug!(documents = ids.len(), services, "loaded documents");
        ids
    }

    /// Forget a file: its text, index generation and classes.
    pub fn remove_file(&mut self, path: &str) -> Option<FileId> {
        let file = self.files.file_for_path(path)?;
        self.files.remove(file);
        self.texts.shift_remove(&file);
        self.index.remove(file);
        self.symbols.remove_file(file);
        Some(file)
    }

    /// Replace the host classes declared by the file at `path`.
    pub fn set_classes(&mut self, path: &str, classes: Vec<ClassEntity>) -> FileId {
        let file = self.file_id_or_alloc(path);
        self.symbols.add_file(file, classes);
        file
    }

    /// Register a schema. References inside matching documents become
    /// resolvable and completable; `insert_handler` runs after the default
    /// handler whenever a class completion is accepted.
    pub fn add_schema(&mut self, schema: Schema, insert_handler: Option<Arc<dyn InsertHandler>>) {
        let registry = ReferenceRegistry::for_schema(&schema.root, insert_handler);
        let keys = KeyVisitor::collect(&schema.root);
        debug!(suffix = %schema.file_suffix, providers = registry.len(), keys = keys.len(), "registered schema");
        self.schemas.push(SchemaEntry { schema, registry, keys });
    }

    /// Read-only view of the current state.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self, snapshot: self.index.snapshot() }
    }
}

/// A consistent view of the project for answering queries.
#[derive(Debug)]
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
    snapshot: Snapshot,
}

impl<'a> Analysis<'a> {
    /// The index snapshot this view was taken from.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Service queries over the snapshot.
    pub fn query(&self) -> ServicesQuery<'_> {
        ServicesQuery::new(&self.snapshot)
    }

    /// Get the FileId for a path.
    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.host.files.file_for_path(path)
    }

    /// Parsed tree of a document with content. Unparsable text yields `None`.
    pub fn document(&self, file: FileId) -> Option<DocTree> {
        let path = self.host.files.path(file)?;
        let text = self.host.texts.get(&file)?;
        match document::parse_document(path, text) {
            Ok(tree) => Some(tree),
            Err(error) => {
                debug!(path, %error, "document cannot be parsed");
                None
            }
        }
    }

    fn ctx<'b>(&'b self, document_path: &'b str) -> ResolveCtx<'b> {
        ResolveCtx {
            symbols: &self.host.symbols,
            query: self.query(),
            files: &self.host.files,
            settings: &self.host.settings,
            document_path,
        }
    }

    fn schemas_for<'b>(&'b self, path: &'b str) -> impl Iterator<Item = &'a SchemaEntry> + 'b
    where
        'a: 'b,
    {
        self.host.schemas.iter().filter(move |entry| entry.schema.applies_to(path))
    }

    /// Resolve every reference at `node`.
    pub fn resolve(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<ResolveResult> {
        let ctx = self.ctx(tree.path());
        self.schemas_for(tree.path())
            .flat_map(|entry| entry.registry.references_at(tree, node))
            .map(|reference| reference.resolve(&ctx))
            .collect()
    }

    /// Ranked value completions at `node`.
    pub fn completions(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<CompletionItem> {
        let ctx = self.ctx(tree.path());
        let mut items: Vec<_> = self
            .schemas_for(tree.path())
            .flat_map(|entry| completion::completions(&ctx, &entry.registry, tree, node))
            .collect();
        items.sort_by(|a, b| b.priority.cmp(&a.priority));
        items
    }

    /// Missing keys the schemas expect below `node`.
    pub fn key_completions(&self, tree: &dyn DocumentTree, node: NodeId) -> Vec<CompletionItem> {
        let mut seen = IndexSet::new();
        self.schemas_for(tree.path())
            .flat_map(|entry| completion::key_completions(&entry.keys, tree, node))
            .filter(|item| seen.insert(item.label.clone()))
            .collect()
    }

    /// Unresolved references of a document.
    pub fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        let Some(tree) = self.document(file) else {
            return Vec::new();
        };
        let ctx = self.ctx(tree.path());
        let mut collector = DiagnosticCollector::new();
        for entry in self.schemas_for(tree.path()) {
            check_references(&ctx, file, &entry.registry, &tree, &mut collector);
        }
        collector.take()
    }

    /// Scopes declared by workflow scope providers.
    pub fn workflow_scopes(&self) -> Vec<WorkflowScope> {
        self.query().workflow_scopes(&self.host.symbols)
    }

    /// Form types usable in API configuration.
    pub fn api_form_types(&self) -> IndexSet<&str> {
        self.query().api_form_types()
    }
}

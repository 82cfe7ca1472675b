//! In-memory [`SymbolTable`].

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::base::FileId;

use super::{CamelHumpMatcher, ClassEntity, SymbolTable};

/// Index into the class slots.
type ClassIdx = usize;

/// Classes of the host language, indexed by qualified name, simple name and
/// declaring file.
///
/// Lookups are case-insensitive, like the host language's class names.
/// Classes are stored in slots referenced by index from every map; removing a
/// file empties its slots instead of compacting, so other indices stay valid.
/// Emptied slots are reused by later additions.
#[derive(Clone, Debug, Default)]
pub struct MemorySymbolTable {
    classes: Vec<Option<Arc<ClassEntity>>>,
    free: Vec<ClassIdx>,
    by_fqn: FxHashMap<Arc<str>, Vec<ClassIdx>>,
    by_name: FxHashMap<Arc<str>, Vec<ClassIdx>>,
    by_file: IndexMap<FileId, Vec<ClassIdx>>,
}

fn key(name: &str) -> Arc<str> {
    Arc::from(name.trim_start_matches('\\').to_lowercase())
}

impl MemorySymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the classes declared by a file, replacing what it declared before.
    pub fn add_file(&mut self, file: FileId, classes: Vec<ClassEntity>) {
        self.remove_file(file);

        let mut file_indices = Vec::with_capacity(classes.len());
        for class in classes {
            let (fqn_key, name_key) = (key(&class.fqn), key(class.name()));
            let idx = self.alloc(class);
            self.by_fqn.entry(fqn_key).or_default().push(idx);
            self.by_name.entry(name_key).or_default().push(idx);
            file_indices.push(idx);
        }
        self.by_file.insert(file, file_indices);
    }

    fn alloc(&mut self, class: ClassEntity) -> ClassIdx {
        let class = Some(Arc::new(class));
        match self.free.pop() {
            Some(idx) => {
                self.classes[idx] = class;
                idx
            }
            None => {
                self.classes.push(class);
                self.classes.len() - 1
            }
        }
    }

    /// Remove every class a file declared.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(indices) = self.by_file.shift_remove(&file) else {
            return;
        };
        for idx in indices {
            let Some(class) = self.classes.get_mut(idx).and_then(Option::take) else {
                continue;
            };
            for (map, k) in [(&mut self.by_fqn, key(&class.fqn)), (&mut self.by_name, key(class.name()))] {
                if let Some(list) = map.get_mut(&k) {
                    list.retain(|&i| i != idx);
                    if list.is_empty() {
                        map.remove(&k);
                    }
                }
            }
            self.free.push(idx);
        }
    }

    fn lookup(&self, map: &FxHashMap<Arc<str>, Vec<ClassIdx>>, name: &str) -> Vec<Arc<ClassEntity>> {
        map.get(key(name).as_ref())
            .map(|indices| indices.iter().filter_map(|&i| self.classes.get(i).cloned().flatten()).collect())
            .unwrap_or_default()
    }

    /// Every live class, in slot order.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassEntity>> {
        self.classes.iter().flatten()
    }

    /// Number of live classes.
    pub fn len(&self) -> usize {
        self.classes().count()
    }

    /// Check if the table holds no class.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SymbolTable for MemorySymbolTable {
    fn classes_by_fqn(&self, fqn: &str) -> Vec<Arc<ClassEntity>> {
        self.lookup(&self.by_fqn, fqn)
    }

    fn classes_by_name(&self, name: &str) -> Vec<Arc<ClassEntity>> {
        self.lookup(&self.by_name, name)
    }

    fn all_class_names(&self, matcher: &CamelHumpMatcher) -> Vec<Arc<str>> {
        let names: IndexSet<&str> =
            self.classes().map(|class| class.name()).filter(|name| matcher.prefix_matches(name)).collect();
        names.into_iter().map(Arc::from).collect()
    }
}

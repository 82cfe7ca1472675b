//! The set of files known to the project, used by file-path references.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::FileId;

/// Known project files, keyed by id with a reverse path lookup.
///
/// Paths are canonical, `/`-separated and absolute. Insertion order is kept
/// so completion lists are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceRoot {
    files: IndexMap<FileId, Arc<str>>,
    by_path: IndexMap<Arc<str>, FileId>,
}

impl SourceRoot {
    /// Create an empty source root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `file` at `path`. A path has one owner: a previous file at
    /// the same path is dropped, and `file` leaves its previous path.
    pub fn insert(&mut self, file: FileId, path: impl Into<Arc<str>>) {
        let path = path.into();
        if let Some(owner) = self.by_path.get(&path).copied().filter(|&owner| owner != file) {
            self.files.shift_remove(&owner);
        }
        if let Some(old) = self.files.insert(file, path.clone()) {
            self.by_path.shift_remove(&old);
        }
        self.by_path.insert(path, file);
    }

    /// Forget a file, returning its path.
    pub fn remove(&mut self, file: FileId) -> Option<Arc<str>> {
        let path = self.files.shift_remove(&file)?;
        self.by_path.shift_remove(&path);
        Some(path)
    }

    /// Path of a known file.
    pub fn path(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(|s| s.as_ref())
    }

    /// File registered at exactly `path`.
    pub fn file_for_path(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    /// Files whose path lies below `dir`, with the path relative to `dir`.
    pub fn files_under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = (FileId, &'a str)> + 'a {
        let dir = dir.trim_end_matches('/');
        self.files.iter().filter_map(move |(&id, path)| {
            path.strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|relative| (id, relative))
        })
    }

    /// Iterate over all files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &str)> + '_ {
        self.files.iter().map(|(&id, path)| (id, path.as_ref()))
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the source root is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_root_lookup_both_ways() {
        let mut root = SourceRoot::new();
        root.insert(FileId::new(0), "/p/a.yml");
        root.insert(FileId::new(1), "/p/b.yml");

        assert_eq!(root.len(), 2);
        assert_eq!(root.path(FileId::new(1)), Some("/p/b.yml"));
        assert_eq!(root.file_for_path("/p/a.yml"), Some(FileId::new(0)));
    }

    #[test]
    fn test_source_root_reinsert_moves_path() {
        let mut root = SourceRoot::new();
        root.insert(FileId::new(0), "/p/old.yml");
        root.insert(FileId::new(0), "/p/new.yml");

        assert_eq!(root.file_for_path("/p/old.yml"), None);
        assert_eq!(root.file_for_path("/p/new.yml"), Some(FileId::new(0)));

        root.remove(FileId::new(0));
        assert!(root.is_empty());
    }

    #[test]
    fn test_source_root_path_has_single_owner() {
        let mut root = SourceRoot::new();
        root.insert(FileId::new(0), "/p/a.yml");
        root.insert(FileId::new(1), "/p/a.yml");

        assert_eq!(root.len(), 1);
        assert_eq!(root.path(FileId::new(0)), None);
        assert_eq!(root.file_for_path("/p/a.yml"), Some(FileId::new(1)));
        assert_eq!(root.iter().collect::<Vec<_>>(), vec![(FileId::new(1), "/p/a.yml")]);
    }

    #[test]
    fn test_files_under() {
        let mut root = SourceRoot::new();
        root.insert(FileId::new(0), "/p/public/js/app.js");
        root.insert(FileId::new(1), "/p/public-other/x.js");
        root.insert(FileId::new(2), "/p/public/css/a.css");

        let under: Vec<_> = root.files_under("/p/public/").map(|(_, rel)| rel).collect();
        assert_eq!(under, vec!["js/app.js", "css/a.css"]);
    }
}

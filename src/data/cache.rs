use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::load_file;
use super::model::StudentTable;
use crate::error::Result;

/// Memoised loads keyed by file path.
///
/// Source files are assumed not to change during a session; call
/// [`LoadCache::invalidate`] to force a reload. Failed loads are not stored.
#[derive(Debug, Default)]
pub struct LoadCache {
    tables: HashMap<PathBuf, Arc<StudentTable>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<StudentTable>> {
        self.get_or_load_with(path, load_file)
    }

    /// Like [`get_or_load`](Self::get_or_load) with a custom loader.
    pub fn get_or_load_with<F>(&mut self, path: &Path, load: F) -> Result<Arc<StudentTable>>
    where
        F: FnOnce(&Path) -> Result<StudentTable>,
    {
        if let Some(table) = self.tables.get(path) {
            log::debug!("Cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load(path)?);
        self.tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table for `path`.  Returns whether one was present.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.tables.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tables.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

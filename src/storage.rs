//! Durable Storage Module
//!
//! A single-file JSON key/value store used as the durable cache medium.
//! Mirrors the role browser-local storage plays for a web client: string
//! items under string keys, shared by the whole process, surviving restarts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::StorageResult;

// == File Store ==
/// Durable string key/value items backed by one JSON file.
///
/// The whole item map is loaded at open and rewritten on every mutation via
/// a temp file + rename, so a crash mid-write leaves the previous file
/// intact. A file that fails to parse is treated as empty rather than as a
/// fatal condition; the data here is a disposable optimization.
///
/// The store holds items for the whole application, not just the cache.
/// Cache code must stay inside its reserved key prefix (see
/// [`crate::cache::STORAGE_PREFIX`]).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    // == Open ==
    /// Opens the store at `path`, loading any existing items.
    ///
    /// A missing file yields an empty store. A malformed file is logged and
    /// also yields an empty store; it will be overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(items) => {
                    debug!("loaded {} durable items from {}", items.len(), path.display());
                    items
                }
                Err(err) => {
                    warn!(
                        "durable store {} is malformed, starting empty: {}",
                        path.display(),
                        err
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            items: Mutex::new(items),
        }
    }

    // == Item Access ==
    /// Returns the item stored under `key`, if any.
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Stores `value` under `key` and rewrites the backing file.
    pub fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.lock();
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    /// Removes the item under `key`, if present.
    ///
    /// The backing file is only rewritten when something was actually
    /// removed, so calling this for an absent key does no I/O.
    pub fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self.lock();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.save(&items)
    }

    /// Removes every item whose key satisfies `predicate`.
    ///
    /// Returns the removed keys. The backing file is rewritten once, and
    /// only when something was removed.
    pub fn remove_items_where(
        &self,
        predicate: impl Fn(&str) -> bool,
    ) -> StorageResult<Vec<String>> {
        let mut items = self.lock();
        let doomed: Vec<String> = items
            .keys()
            .filter(|key| predicate(key))
            .cloned()
            .collect();

        if doomed.is_empty() {
            return Ok(Vec::new());
        }

        for key in &doomed {
            items.remove(key);
        }
        self.save(&items)?;
        Ok(doomed)
    }

    // == Inspection ==
    /// Returns all stored keys.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Returns the current number of items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Internals ==
    /// Items are disposable, so a poisoned lock still holds a usable map.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrites the backing file from the in-memory map.
    fn save(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

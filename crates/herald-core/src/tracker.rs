use crate::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Durable set of item ids that were successfully announced.
///
/// Every mutation rewrites the whole file. A failed write is logged and the
/// in-memory set keeps the change, so the worst outcome is a repeated
/// announcement after restart, never a lost record of a send that happened.
#[derive(Debug)]
pub struct TrackedStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl TrackedStore {
    /// Load the store from `path`. A missing file is an empty store; an
    /// unreadable or unparseable one is an empty store with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match crate::io::read_if_exists(&path) {
            Ok(None) => BTreeSet::new(),
            Ok(Some(data)) => match serde_json::from_str::<Vec<String>>(&data) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not parse tracked items, starting fresh");
                    BTreeSet::new()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read tracked items, starting fresh");
                BTreeSet::new()
            }
        };
        tracing::debug!(path = %path.display(), count = ids.len(), "tracked items loaded");
        Self { path, ids }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Record an announced id. A failed write is logged, not returned.
    pub fn add(&mut self, id: &str) {
        self.ids.insert(id.to_string());
        self.persist_or_log();
    }

    /// Insert `id` and write the file once. Returns false when it was
    /// already tracked.
    pub fn insert(&mut self, id: &str) -> Result<bool> {
        let added = self.ids.insert(id.to_string());
        self.save()?;
        Ok(added)
    }

    /// Returns false when the id was not tracked; nothing is written then.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.ids.remove(id) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Forget every id. Returns how many were dropped.
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.ids.len();
        self.ids.clear();
        self.save()?;
        Ok(count)
    }

    /// Write the full set to disk.
    pub fn save(&self) -> Result<()> {
        let list: Vec<&str> = self.ids().collect();
        let data = serde_json::to_string_pretty(&list)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.save() {
            tracing::error!(path = %self.path.display(), error = %e, "failed to save tracked items");
        }
    }
}

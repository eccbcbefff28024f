//! Collection implementation
//!
//! Composes an [`Index`] and a [`Log`] into a key-value API.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SlateError};
use crate::index::Index;
use crate::log::Log;

use super::KeyPattern;

/// Summary of a collection's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Number of live keys
    pub count: usize,

    /// Log file length in bytes
    pub size: u64,
}

/// A named key-value collection backed by one log file
///
/// Values come back wrapped as a single-entry JSON object `{key: value}`.
///
/// ## Index maintenance
/// - New key: the record is appended and one index entry is added
/// - Existing key: the old record is spliced out, the new one appended,
///   and the whole index is rebuilt from a scan
/// - Remove: the record is spliced out and the whole index is rebuilt
///
/// A structural mutation that fails part way still rebuilds the index from
/// whatever the log now holds. If that scan fails too, the index is emptied
/// and marked stale, and every later call rescans before touching an offset.
pub struct Collection {
    /// Collection name (as given, usually lowercased by the database)
    name: String,

    /// Backing log; `None` once the collection has been dropped
    log: Option<Log>,

    /// Key → offset of the key's current record
    index: Index,

    /// Set when the index could not be rebuilt after a mutation
    stale: bool,
}

impl Collection {
    /// Open the collection stored at `path`, creating the file if needed
    ///
    /// The index is built from one full scan of the log.
    pub fn open(name: impl Into<String>, path: &Path) -> Result<Self> {
        let name = name.into();
        let mut log = Log::open(path)?;
        let index = Index::from_scan(log.scan()?);

        tracing::debug!(
            "Opened collection '{}' at {} ({} keys)",
            name,
            path.display(),
            index.count()
        );

        Ok(Self {
            name,
            log: Some(log),
            index,
            stale: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `destroy` has been called
    pub fn is_dropped(&self) -> bool {
        self.log.is_none()
    }

    /// Path of the backing log file
    pub fn path(&self) -> Result<&Path> {
        Ok(self.open_log()?.path())
    }

    /// The current key → offset index (empty while stale)
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Fetch the value stored under `key` as `{key: value}`
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        self.ensure_index()?;
        let log = log_mut(&mut self.log, &self.name)?;

        let Some(offset) = self.index.get(key.as_bytes()) else {
            return Ok(None);
        };

        let value = log.read_value(offset)?;
        Ok(Some(entry(key.as_bytes(), value)))
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.ensure_index()?;
        let log = log_mut(&mut self.log, &self.name)?;

        match self.index.get(key.as_bytes()) {
            Some(offset) => {
                let updated = log.update(offset, key.as_bytes(), value);
                // Every record after the old one moved
                self.finish_mutation(updated)?;
            }
            None => {
                let offset = log.append(key.as_bytes(), value)?;
                self.index.set(key.as_bytes().to_vec(), offset);
            }
        }

        tracing::trace!("Set key {:?} in collection '{}'", key, self.name);
        Ok(())
    }

    /// Remove `key`; returns `false` when it was not present
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        self.ensure_index()?;
        let log = log_mut(&mut self.log, &self.name)?;

        let Some(offset) = self.index.get(key.as_bytes()) else {
            return Ok(false);
        };

        let removed = log.remove(offset);
        self.finish_mutation(removed)?;

        tracing::trace!("Removed key {:?} from collection '{}'", key, self.name);
        Ok(true)
    }

    /// Every `{key: value}` pair in index order
    pub fn all(&mut self) -> Result<Vec<Value>> {
        self.ensure_index()?;
        let log = log_mut(&mut self.log, &self.name)?;
        resolve(log, self.index.iter())
    }

    /// Every `{key: value}` whose key matches the case-insensitive `pattern`
    pub fn query(&mut self, pattern: &str) -> Result<Vec<Value>> {
        let pattern = KeyPattern::new(pattern, false)?;
        self.ensure_index()?;
        let log = log_mut(&mut self.log, &self.name)?;

        resolve(
            log,
            self.index.iter().filter(|(key, _)| pattern.is_match(key)),
        )
    }

    /// Number of keys, optionally only those matching `pattern`
    ///
    /// With `exact` the pattern is anchored at both ends of the key.
    pub fn count(&mut self, pattern: Option<&str>, exact: bool) -> Result<usize> {
        self.ensure_index()?;
        self.open_log()?;

        match pattern {
            None => Ok(self.index.count()),
            Some(pattern) => {
                let pattern = KeyPattern::new(pattern, exact)?;
                Ok(self.index.keys().filter(|key| pattern.is_match(key)).count())
            }
        }
    }

    /// Number of keys in the index
    pub fn len(&self) -> usize {
        self.index.count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Remove every key and empty the log file
    pub fn truncate(&mut self) -> Result<()> {
        let log = log_mut(&mut self.log, &self.name)?;

        self.index.clear();
        if let Err(e) = log.truncate() {
            // The log may still hold records the index no longer lists
            self.stale = true;
            return Err(e);
        }
        self.stale = false;

        tracing::debug!("Truncated collection '{}'", self.name);
        Ok(())
    }

    /// Close the log and delete its file
    ///
    /// The collection is unusable afterwards; every further call fails with
    /// `CollectionDropped`.
    pub fn destroy(&mut self) -> Result<()> {
        let log = self
            .log
            .take()
            .ok_or_else(|| SlateError::CollectionDropped(self.name.clone()))?;

        self.index.clear();
        log.destroy()?;

        tracing::debug!("Dropped collection '{}'", self.name);
        Ok(())
    }

    /// Key count and file size
    pub fn info(&mut self) -> Result<CollectionInfo> {
        self.ensure_index()?;
        let log = self.open_log()?;
        Ok(CollectionInfo {
            count: self.index.count(),
            size: log.size()?,
        })
    }

    /// Replace the index with the result of a fresh log scan
    ///
    /// When the scan fails the index is emptied and left stale.
    pub fn rebuild_index(&mut self) -> Result<()> {
        let log = log_mut(&mut self.log, &self.name)?;

        let entries = match log.scan() {
            Ok(entries) => entries,
            Err(e) => {
                self.index.clear();
                self.stale = true;
                tracing::warn!(
                    "Index of collection '{}' could not be rebuilt: {}",
                    self.name,
                    e
                );
                return Err(e);
            }
        };
        self.index.rebuild(entries);
        self.stale = false;

        tracing::trace!(
            "Rebuilt index of collection '{}' ({} keys)",
            self.name,
            self.index.count()
        );
        Ok(())
    }

    /// Whether the last rebuild failed and the index is empty until rescanned
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn ensure_index(&mut self) -> Result<()> {
        if self.stale {
            self.rebuild_index()?;
        }
        Ok(())
    }

    /// Rebuild after a mutation that shifted records, whether or not it
    /// succeeded; the mutation's own error takes precedence
    fn finish_mutation<T>(&mut self, outcome: Result<T>) -> Result<T> {
        let rebuilt = self.rebuild_index();
        let value = outcome?;
        rebuilt?;
        Ok(value)
    }

    fn open_log(&self) -> Result<&Log> {
        self.log
            .as_ref()
            .ok_or_else(|| SlateError::CollectionDropped(self.name.clone()))
    }
}

/// Borrow the log without borrowing the rest of the collection
fn log_mut<'a>(log: &'a mut Option<Log>, name: &str) -> Result<&'a mut Log> {
    log.as_mut()
        .ok_or_else(|| SlateError::CollectionDropped(name.to_string()))
}

/// Read the value at each offset and wrap it with its key
fn resolve<'k>(
    log: &mut Log,
    entries: impl Iterator<Item = (&'k [u8], u64)>,
) -> Result<Vec<Value>> {
    entries
        .map(|(key, offset)| -> Result<Value> { Ok(entry(key, log.read_value(offset)?)) })
        .collect()
}

fn entry(key: &[u8], value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(String::from_utf8_lossy(key).into_owned(), value);
    Value::Object(map)
}

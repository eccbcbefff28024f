//! Index implementation
//!
//! IndexMap-based key → offset table.

use indexmap::IndexMap;

use crate::log::ScanEntry;

/// Key → record offset mapping for one collection
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    entries: IndexMap<Vec<u8>, u64>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from the output of a log scan
    pub fn from_scan(entries: Vec<ScanEntry>) -> Self {
        let mut index = Self::new();
        index.rebuild(entries);
        index
    }

    /// Replace the whole contents with the output of a log scan
    ///
    /// A repeated key keeps its first position but takes the later offset.
    pub fn rebuild(&mut self, entries: Vec<ScanEntry>) {
        self.entries.clear();
        self.entries.reserve(entries.len());
        for ScanEntry { key, offset } in entries {
            self.entries.insert(key, offset);
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Offset of the record for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Insert a new key at the end, or overwrite the offset of an existing one
    pub fn set(&mut self, key: Vec<u8>, offset: u64) {
        self.entries.insert(key, offset);
    }

    /// Remove a key, returning its offset
    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.entries.shift_remove(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.entries.keys().map(|k| k.as_slice())
    }

    /// `(key, offset)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> + '_ {
        self.entries.iter().map(|(k, &offset)| (k.as_slice(), offset))
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

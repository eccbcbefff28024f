//! Log Scanner
//!
//! Sequential pass over every record from offset 0 to the end of the log.

use std::fs::File;

use crate::error::{Result, SlateError};
use crate::record::HEADER_SIZE;

use super::file::{check_bounds, read_bytes_at, read_header_at};
use super::lock::FileLock;

/// Key and start offset of one record found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub key: Vec<u8>,
    pub offset: u64,
}

/// Iterator over record starts in ascending offset order
///
/// Holds a shared lock on the log until dropped.
pub struct LogScanner<'a> {
    file: &'a File,
    _lock: FileLock<'a>,
    /// Length of the log when the scan started
    file_len: u64,
    /// Offset of the next header to read
    cursor: u64,
    done: bool,
}

impl<'a> LogScanner<'a> {
    pub(super) fn new(file: &'a File) -> Result<Self> {
        let lock = FileLock::shared(file)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            file,
            _lock: lock,
            file_len,
            cursor: 0,
            done: false,
        })
    }

    /// Offset the next record is expected at
    pub fn position(&self) -> u64 {
        self.cursor
    }
}

impl Iterator for LogScanner<'_> {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.cursor;
        let header = match read_header_at(self.file, offset) {
            Ok(header) => header,
            Err(SlateError::EndOfLog(_)) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if let Err(e) = check_bounds(offset, &header, self.file_len) {
            self.done = true;
            return Some(Err(e));
        }

        let key = match read_bytes_at(
            self.file,
            offset,
            offset + HEADER_SIZE as u64,
            header.key_len as usize,
        ) {
            Ok(key) => key,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        // Skip over the value to the next header
        self.cursor = offset + header.record_len();

        Some(Ok(ScanEntry { key, offset }))
    }
}

//! Log file
//!
//! Owns the file handle of one collection log and performs every byte-level
//! operation on it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, SlateError};
use crate::record::{self, Record, RecordHeader, HEADER_SIZE};

use super::lock::FileLock;
use super::scan::{LogScanner, ScanEntry};

/// Append-only record log backed by a single file
///
/// The file handle lives exactly as long as the `Log`; it is closed when the
/// value is dropped or consumed by [`Log::destroy`].
#[derive(Debug)]
pub struct Log {
    /// Location of the log on disk
    path: PathBuf,

    /// Open read/write handle
    file: File,
}

impl Log {
    /// Open a log, creating an empty file if none exists
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        tracing::debug!("Opened log {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the file in bytes
    pub fn size(&self) -> Result<u64> {
        let _lock = FileLock::shared(&self.file)?;
        Ok(self.file.metadata()?.len())
    }

    /// Append one record at the end of the file
    ///
    /// Returns the offset the record starts at. A failed write is rolled back
    /// by truncating to that offset so no partial record is left behind.
    pub fn append(&mut self, key: &[u8], value: &Value) -> Result<u64> {
        let encoded = record::encode(key, value)?;
        self.append_encoded(&encoded)
    }

    fn append_encoded(&mut self, encoded: &[u8]) -> Result<u64> {
        let _lock = FileLock::exclusive(&self.file)?;
        let mut file = &self.file;

        let offset = file.seek(SeekFrom::End(0))?;
        if let Err(e) = file.write_all(encoded).and_then(|_| file.flush()) {
            if let Err(rollback) = self.file.set_len(offset) {
                tracing::warn!(
                    "Failed to roll back partial record at offset {} in {}: {}",
                    offset,
                    self.path.display(),
                    rollback
                );
            }
            return Err(e.into());
        }

        tracing::trace!(
            "Appended {} byte record at offset {} to {}",
            encoded.len(),
            offset,
            self.path.display()
        );

        Ok(offset)
    }

    /// Read the header of the record starting at `offset`
    ///
    /// Fails with `EndOfLog` when no byte exists at `offset` and with
    /// `MalformedRecord` when the header is cut short.
    pub fn read_header(&mut self, offset: u64) -> Result<RecordHeader> {
        let _lock = FileLock::shared(&self.file)?;
        read_header_at(&self.file, offset)
    }

    /// Read and decode the value of the record starting at `offset`
    pub fn read_value(&mut self, offset: u64) -> Result<Value> {
        let _lock = FileLock::shared(&self.file)?;

        let header = require_header_at(&self.file, offset)?;
        check_bounds(offset, &header, self.file.metadata()?.len())?;

        let value_start = offset + HEADER_SIZE as u64 + header.key_len as u64;
        let bytes = read_bytes_at(&self.file, offset, value_start, header.value_len as usize)?;

        record::decode_value(offset, &bytes)
    }

    /// Read the full record (key and value) starting at `offset`
    pub fn read_record(&mut self, offset: u64) -> Result<Record> {
        let _lock = FileLock::shared(&self.file)?;

        let header = require_header_at(&self.file, offset)?;
        check_bounds(offset, &header, self.file.metadata()?.len())?;

        let key_start = offset + HEADER_SIZE as u64;
        let key = read_bytes_at(&self.file, offset, key_start, header.key_len as usize)?;
        let bytes = read_bytes_at(
            &self.file,
            offset,
            key_start + header.key_len as u64,
            header.value_len as usize,
        )?;

        Ok(Record {
            key,
            value: record::decode_value(offset, &bytes)?,
        })
    }

    /// Excise the record starting at `offset`
    ///
    /// Every byte after the record is buffered, the file is cut at `offset`
    /// and the buffer is written back, so all later records move left by the
    /// removed length. Returns that length.
    pub fn remove(&mut self, offset: u64) -> Result<u64> {
        let _lock = FileLock::exclusive(&self.file)?;
        let mut file = &self.file;

        let header = require_header_at(file, offset)?;
        let file_len = file.metadata()?.len();
        check_bounds(offset, &header, file_len)?;

        let record_len = header.record_len();
        let tail_start = offset + record_len;

        // Everything after the target record
        file.seek(SeekFrom::Start(tail_start))?;
        let mut tail = Vec::with_capacity((file_len - tail_start) as usize);
        file.read_to_end(&mut tail)?;

        self.file.set_len(offset)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&tail)?;
        file.flush()?;

        tracing::trace!(
            "Removed {} byte record at offset {} from {} ({} tail bytes moved)",
            record_len,
            offset,
            self.path.display(),
            tail.len()
        );

        Ok(record_len)
    }

    /// Replace the record at `offset` by removing it and appending a new one
    ///
    /// Returns the offset of the new record. The new record is encoded
    /// before anything is removed, so an unencodable value leaves the file
    /// untouched. The two steps are separate critical sections; a crash or
    /// a failed append between them loses the record.
    pub fn update(&mut self, offset: u64, key: &[u8], value: &Value) -> Result<u64> {
        let encoded = record::encode(key, value)?;
        self.remove(offset)?;
        self.append_encoded(&encoded)
    }

    /// Reset the file length to zero
    pub fn truncate(&mut self) -> Result<()> {
        let _lock = FileLock::exclusive(&self.file)?;
        self.file.set_len(0)?;
        (&self.file).seek(SeekFrom::Start(0))?;

        tracing::debug!("Truncated log {}", self.path.display());
        Ok(())
    }

    /// Lazily iterate over every record start, holding a shared lock
    pub fn iter(&mut self) -> Result<LogScanner<'_>> {
        LogScanner::new(&self.file)
    }

    /// Collect `(key, offset)` for every record in ascending offset order
    pub fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        self.iter()?.collect()
    }

    /// Close the file handle and delete the file
    pub fn destroy(self) -> Result<()> {
        let Log { path, file } = self;
        drop(file);

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::debug!("Deleted log {}", path.display());
        Ok(())
    }
}

// =============================================================================
// Positioned read helpers (callers hold the lock)
// =============================================================================

/// Read the 8-byte header at `offset`
pub(super) fn read_header_at(mut file: &File, offset: u64) -> Result<RecordHeader> {
    file.seek(SeekFrom::Start(offset))?;

    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Err(SlateError::EndOfLog(offset)),
        HEADER_SIZE => Ok(RecordHeader::from_bytes(&header)),
        n => Err(SlateError::malformed(
            offset,
            format!("truncated header: {} of {} bytes", n, HEADER_SIZE),
        )),
    }
}

/// Like `read_header_at`, but an offset at the end of the log is corruption
fn require_header_at(file: &File, offset: u64) -> Result<RecordHeader> {
    read_header_at(file, offset).map_err(|e| match e {
        SlateError::EndOfLog(at) => SlateError::malformed(at, "no record at offset"),
        other => other,
    })
}

/// Fail when the record declared by `header` runs past `file_len`
pub(super) fn check_bounds(offset: u64, header: &RecordHeader, file_len: u64) -> Result<()> {
    let end = offset + header.record_len();
    if end > file_len {
        return Err(SlateError::malformed(
            offset,
            format!(
                "record declares {} bytes but only {} remain",
                header.record_len(),
                file_len.saturating_sub(offset)
            ),
        ));
    }
    Ok(())
}

/// Read exactly `len` bytes at `pos` belonging to the record at `record_offset`
pub(super) fn read_bytes_at(
    mut file: &File,
    record_offset: u64,
    pos: u64,
    len: usize,
) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(pos))?;

    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            SlateError::malformed(
                record_offset,
                format!("truncated payload: expected {} bytes at {}", len, pos),
            )
        } else {
            SlateError::Io(e)
        }
    })?;

    Ok(buf)
}

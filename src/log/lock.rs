//! Advisory file locks scoped to a single log operation.

use std::fs::File;

use fs2::FileExt;

use crate::error::Result;

/// Holds a shared or exclusive lock on a log file until dropped
pub(crate) struct FileLock<'a> {
    file: &'a File,
}

impl<'a> FileLock<'a> {
    /// Block until a shared (read) lock is held
    pub(crate) fn shared(file: &'a File) -> Result<Self> {
        // Explicit fs2 call: newer std has inherent File::lock_shared
        FileExt::lock_shared(file)?;
        Ok(Self { file })
    }

    /// Block until an exclusive (write) lock is held
    pub(crate) fn exclusive(file: &'a File) -> Result<Self> {
        FileExt::lock_exclusive(file)?;
        Ok(Self { file })
    }
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(self.file) {
            tracing::warn!("Failed to release log file lock: {}", e);
        }
    }
}

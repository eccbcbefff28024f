//! Record Log Module
//!
//! One append-only file of concatenated records per collection.
//!
//! ## Responsibilities
//! - Append records and report the offset they start at
//! - Read a record's header or value at an exact offset
//! - Excise a record by rewriting the tail of the file
//! - Scan the whole file to recover `(key, offset)` pairs
//!
//! ## Locking
//! Every operation holds an advisory lock on the file for exactly its own
//! duration: shared for reads and scans, exclusive for append, remove and
//! truncate. Nothing is held between operations, so a remove followed by a
//! scan is two separate critical sections.
//!
//! ## Offsets
//! ```text
//! offset 0                 r1 = 8+k0+v0               r2 = r1+8+k1+v1
//! ┌──────┬─────┬─────────┐┌──────┬─────┬─────────┐┌──────┬───
//! │ hdr  │ key │ value   ││ hdr  │ key │ value   ││ hdr  │ ...
//! └──────┴─────┴─────────┘└──────┴─────┴─────────┘└──────┴───
//! ```
//! Removing the record at `r1` shifts every later record left by its length,
//! which invalidates every offset held for those records.

mod file;
mod lock;
mod scan;

pub use file::Log;
pub use scan::{LogScanner, ScanEntry};

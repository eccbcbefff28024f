//! Index Module
//!
//! In-memory mapping from key to the offset of its current record.
//!
//! ## Responsibilities
//! - O(1) key → offset lookups for reads and updates
//! - Preserve insertion order, which equals log scan order
//! - Be rebuilt wholesale from a log scan after any byte-shifting write
//!
//! ## Data Structure Choice
//! Using `IndexMap`:
//! - Hash lookups like a `HashMap`
//! - Iteration in insertion order, so `keys()` follows the log
//! - `shift_remove` keeps the remaining order intact
//!
//! The index is never persisted; every process rebuilds its own on open.

mod table;

pub use table::Index;

//! Record Module
//!
//! The on-disk unit of a collection log.
//!
//! ## Responsibilities
//! - Encode a key and a JSON value into one length-prefixed record
//! - Decode headers, keys and values back out of raw bytes
//! - Reject keys/values that do not fit the 32-bit length fields
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬──────────────┬─────────────┬───────────────┐
//! │ KeyLen (4)   │ ValLen (4)   │ Key         │ Value (JSON)  │
//! │ u32 BE       │ u32 BE       │ KeyLen B    │ ValLen B      │
//! └──────────────┴──────────────┴─────────────┴───────────────┘
//! ```
//!
//! Records are concatenated with no padding and no delimiter; the header
//! lengths alone decide where the next record starts.

mod codec;

pub use codec::{decode, decode_value, encode, encode_value, Record, RecordHeader, HEADER_SIZE};

//! Collection Module
//!
//! A named key-value namespace: one record log plus its offset index.
//!
//! ## Responsibilities
//! - Key-level get/set/remove on top of the log's offset-level primitives
//! - Keep the index in step with the log after every mutation
//! - Case-insensitive regex queries over the key set
//!
//! ## Lifecycle
//! ```text
//! open ──scan──▶ Indexed ──get/query──▶ Indexed
//!                   │
//!                   ├──set(existing)/remove──▶ Rebuilding ──scan──▶ Indexed
//!                   │
//!                   └──drop──▶ Dropped (terminal)
//! ```

mod query;
mod store;

pub use query::KeyPattern;
pub use store::{Collection, CollectionInfo};

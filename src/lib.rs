//! # SlateKV
//!
//! A small embedded key-value store with:
//! - One append-only record log per named collection
//! - An in-memory key → offset index rebuilt from the log on open
//! - Case-insensitive regex queries over keys
//! - A JSON-over-TCP protocol with a blocking client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 TCP Server / Client                          │
//! │        (banner, one JSON request, one JSON response)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Database                                │
//! │          (collection registry, one dir on disk)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │       Collection        │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Index    │          │     Log     │
//!   │ key→offset  │          │  (records)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod log;
pub mod index;
pub mod collection;
pub mod database;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SlateError};
pub use config::Config;
pub use collection::{Collection, CollectionInfo};
pub use database::Database;
pub use index::Index;
pub use log::Log;
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SlateKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

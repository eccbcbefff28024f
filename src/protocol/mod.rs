//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (JSON over TCP)
//!
//! ### Connection
//! ```text
//! client                                server
//!   │ ──────────── connect ─────────────▶ │
//!   │ ◀──────── banner (26 bytes) ─────── │
//!   │ ─────────── request (JSON) ───────▶ │
//!   │ ◀────────── response (JSON) ─────── │
//!   │ ◀──────────── close ─────────────── │
//! ```
//! One request per connection. There is no length prefix: the server parses
//! exactly one JSON value, and the response ends where the stream ends.
//!
//! ### Request
//! `{"client": "...", "method": "get", "arguments": ["key"], "collection": "users"}`
//!
//! ### Methods
//! - With a collection: get, set, remove, query, count, all, truncate, info, drop
//! - Without: all (list collections), drop (by name), dropAll, ping
//!
//! ### Response
//! `{"status": "ok" | "not_found" | "error", "result": ..., "message": "..."}`

mod codec;
mod command;
mod request;
mod response;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_banner, read_request,
    read_response, write_banner, write_request, write_response, BANNER, BANNER_LEN,
    MAX_MESSAGE_SIZE,
};
pub use command::{Command, CommandType};
pub use request::{Request, CLIENT_NAME};
pub use response::{Response, Status};

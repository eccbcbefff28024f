//! Network Module
//!
//! TCP server, connection handling and the client driver.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - Bounded channel of accepted streams
//! - Worker thread pool, one request per connection
//! - Commands routed through Database

mod client;
mod connection;
mod server;

pub use client::{Client, RemoteCollection};
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};

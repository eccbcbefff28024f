//! Client Driver
//!
//! Blocking client for a SlateKV server. Every call opens a fresh
//! connection, checks the banner, sends one request and reads the response
//! until the server closes the stream.

use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::Value;

use crate::collection::CollectionInfo;
use crate::database::CollectionSummary;
use crate::error::{Result, SlateError};
use crate::protocol::{read_banner, read_response, write_request, Command, Request, Response};

/// Default connect/read/write timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for a remote SlateKV server
#[derive(Debug, Clone)]
pub struct Client {
    /// Server address (host:port)
    addr: String,

    /// Applied to connect, read and write
    timeout: Duration,
}

impl Client {
    /// Create a client for `addr` (`host:port`); nothing is connected yet
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client from a separate host and port
    pub fn with_host_port(host: &str, port: u16) -> Self {
        Self::new(format!("{}:{}", host, port))
    }

    /// Set the connect/read/write timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Scope subsequent calls to a collection
    pub fn collection(&self, name: impl Into<String>) -> RemoteCollection<'_> {
        RemoteCollection {
            client: self,
            name: name.into(),
        }
    }

    // =========================================================================
    // Raw calls
    // =========================================================================

    /// Send an arbitrary method name; the server decides whether it exists
    pub fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Response> {
        self.send(&Request::new(method, arguments))
    }

    /// Send a validated command
    pub fn execute(&self, command: Command) -> Result<Response> {
        self.send(&command.into_request())
    }

    /// Send one request over a new connection and read its response
    pub fn send(&self, request: &Request) -> Result<Response> {
        let mut stream = self.connect()?;

        write_request(&mut stream, request).map_err(|e| self.connection_error("send", e))?;
        // Nothing more will be written on this connection
        let _ = stream.shutdown(Shutdown::Write);

        read_response(&mut stream).map_err(|e| match e {
            SlateError::Io(_) => self.connection_error("receive", e),
            other => other,
        })
    }

    // =========================================================================
    // Database-level helpers
    // =========================================================================

    /// Check that the server answers
    pub fn ping(&self) -> Result<()> {
        expect_ok(self.execute(Command::Ping)?).map(|_| ())
    }

    /// Name, count and size of every collection on the server
    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        let result = expect_ok(self.execute(Command::ListCollections)?)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Drop a collection by name
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        expect_ok(self.execute(Command::DropCollection {
            name: name.to_string(),
        })?)
        .map(|_| ())
    }

    /// Drop every collection; returns how many were dropped
    pub fn drop_all(&self) -> Result<usize> {
        let result = expect_ok(self.execute(Command::DropAll)?)?;
        Ok(serde_json::from_value(result)?)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Connect and consume the banner
    fn connect(&self) -> Result<TcpStream> {
        let addrs = self
            .addr
            .to_socket_addrs()
            .map_err(|e| self.connection_error("resolve", e.into()))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(mut stream) => {
                    stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
                        .map_err(|e| self.connection_error("configure", e.into()))?;

                    read_banner(&mut stream).map_err(|e| self.connection_error("handshake", e))?;

                    tracing::trace!("Connected to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => self.connection_error("connect", e.into()),
            None => SlateError::Connection(format!("{}: no addresses to connect to", self.addr)),
        })
    }

    fn connection_error(&self, during: &str, e: SlateError) -> SlateError {
        SlateError::Connection(format!("{} ({}): {}", self.addr, during, e))
    }
}

/// A client scoped to one collection
#[derive(Debug, Clone)]
pub struct RemoteCollection<'a> {
    client: &'a Client,
    name: String,
}

impl RemoteCollection<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send an arbitrary method name against this collection
    pub fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Response> {
        self.client
            .send(&Request::new(method, arguments).with_collection(self.name.clone()))
    }

    /// Fetch `{key: value}`, or `None` when the key is absent
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.client
            .execute(Command::Get {
                collection: self.name.clone(),
                key: key.to_string(),
            })?
            .into_result()
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        expect_ok(self.client.execute(Command::Set {
            collection: self.name.clone(),
            key: key.to_string(),
            value,
        })?)
        .map(|_| ())
    }

    /// Remove a key; `false` when it was absent
    pub fn remove(&self, key: &str) -> Result<bool> {
        let outcome = self
            .client
            .execute(Command::Remove {
                collection: self.name.clone(),
                key: key.to_string(),
            })?
            .into_result()?;
        Ok(outcome.is_some())
    }

    pub fn query(&self, pattern: &str) -> Result<Vec<Value>> {
        let result = expect_ok(self.client.execute(Command::Query {
            collection: self.name.clone(),
            pattern: pattern.to_string(),
        })?)?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn count(&self, pattern: Option<&str>, exact: bool) -> Result<usize> {
        let result = expect_ok(self.client.execute(Command::Count {
            collection: self.name.clone(),
            pattern: pattern.map(str::to_string),
            exact,
        })?)?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn all(&self) -> Result<Vec<Value>> {
        let result = expect_ok(self.client.execute(Command::All {
            collection: self.name.clone(),
        })?)?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn truncate(&self) -> Result<()> {
        expect_ok(self.client.execute(Command::Truncate {
            collection: self.name.clone(),
        })?)
        .map(|_| ())
    }

    pub fn info(&self) -> Result<CollectionInfo> {
        let result = expect_ok(self.client.execute(Command::Info {
            collection: self.name.clone(),
        })?)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Drop the collection on the server
    pub fn drop_collection(&self) -> Result<()> {
        expect_ok(self.client.execute(Command::Drop {
            collection: self.name.clone(),
        })?)
        .map(|_| ())
    }
}

/// The result of an OK response; NOT_FOUND becomes `KeyNotFound`
fn expect_ok(response: Response) -> Result<Value> {
    response.into_result()?.ok_or(SlateError::KeyNotFound)
}

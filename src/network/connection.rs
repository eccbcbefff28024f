//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::database::Database;
use crate::error::{Result, SlateError};
use crate::protocol::{read_request, write_banner, write_response, Command, Request, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the database
    database: Arc<Database>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on two handles of the same socket
    pub fn new(stream: TcpStream, database: Arc<Database>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            database,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection: banner, one request, one response, close
    ///
    /// The write side is shut down after the response, which is how the
    /// client knows the response is complete.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        if let Err(e) = write_banner(&mut self.writer) {
            return self.client_gone(e, "sending banner");
        }

        let request = match read_request(&mut self.reader) {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::debug!("Client {} closed without a request", self.peer_addr);
                return Ok(());
            }
            Err(SlateError::Io(ref e)) if is_disconnect(e.kind()) || is_timeout(e.kind()) => {
                tracing::debug!(
                    "Client {} went away before sending a request: {}",
                    self.peer_addr,
                    e
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                // Send error response if possible
                let _ = self.send_response(Response::error(&e.to_string()));
                return Err(e);
            }
        };

        tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

        let response = self.execute_request(request);

        if let Err(e) = self.send_response(response) {
            return self.client_gone(e, "sending response");
        }

        Ok(())
    }

    /// Validate and execute a request, mapping the outcome to a response
    fn execute_request(&self, request: Request) -> Response {
        let command = match Command::try_from(request) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!("Rejected request from {}: {}", self.peer_addr, e);
                return Response::error(&e.to_string());
            }
        };

        match self.database.execute(command) {
            Ok(result) => Response::ok(result),
            Err(SlateError::KeyNotFound) => Response::not_found(),
            Err(e) => Response::error(&e.to_string()),
        }
    }

    /// Send a response to the client and close our write side
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;

        match self.writer.get_ref().shutdown(Shutdown::Write) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// If the client disconnected (abort/reset/broken pipe), log and exit
    /// gracefully rather than treating it as a server error.
    fn client_gone(&self, e: SlateError, during: &str) -> Result<()> {
        if let SlateError::Io(ref io_err) = e {
            if is_disconnect(io_err.kind()) {
                tracing::debug!(
                    "Client {} disconnected while {}: {}",
                    self.peer_addr,
                    during,
                    e
                );
                return Ok(());
            }
        }
        tracing::warn!("Error {} to {}: {}", during, self.peer_addr, e);
        Err(e)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}

/// Read timeout (Windows uses TimedOut instead of WouldBlock)
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

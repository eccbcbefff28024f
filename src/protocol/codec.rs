//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Banner
//! ```text
//! ┌───────────────────────────────────┐
//! │ "slatekv: connection ready\n" (26)│
//! └───────────────────────────────────┘
//! ```
//!
//! ### Request / Response
//! One JSON object each, no length prefix. Requests are cut from the stream
//! by the JSON parser; responses run until the server closes the stream.

use std::io::{Read, Write};

use crate::error::{Result, SlateError};

use super::{Request, Response};

/// Length of the banner the server sends on accept
pub const BANNER_LEN: usize = 26;

/// Banner the server sends before reading a request
pub const BANNER: &[u8; BANNER_LEN] = b"slatekv: connection ready\n";

/// Maximum size of one request or response (16 MB)
pub const MAX_MESSAGE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// Banner
// =============================================================================

/// Write the banner to a stream
pub fn write_banner<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(BANNER)?;
    writer.flush()?;
    Ok(())
}

/// Read and check the banner from a stream
pub fn read_banner<R: Read>(reader: &mut R) -> Result<()> {
    let mut banner = [0u8; BANNER_LEN];
    reader.read_exact(&mut banner)?;

    if &banner != BANNER {
        return Err(SlateError::Protocol(format!(
            "Unexpected banner: {:?}",
            String::from_utf8_lossy(&banner)
        )));
    }
    Ok(())
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(request)?)
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    serde_json::from_slice(bytes)
        .map_err(|e| SlateError::Protocol(format!("Invalid request: {}", e)))
}

/// Read exactly one request from a stream
///
/// Returns `None` when the stream ends before any request byte arrives.
/// Bytes after the first JSON value are left unread.
pub fn read_request<R: Read>(reader: R) -> Result<Option<Request>> {
    let limited = reader.take(MAX_MESSAGE_SIZE);
    let mut stream = serde_json::Deserializer::from_reader(limited).into_iter::<Request>();

    match stream.next() {
        None => Ok(None),
        Some(Ok(request)) => Ok(Some(request)),
        Some(Err(e)) if e.is_io() => Err(SlateError::Io(e.into())),
        Some(Err(e)) if e.is_eof() => Err(SlateError::Protocol(format!(
            "Incomplete request: {}",
            e
        ))),
        Some(Err(e)) => Err(SlateError::Protocol(format!("Invalid request: {}", e))),
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.is_empty() {
        return Err(SlateError::Protocol("Empty response".to_string()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| SlateError::Protocol(format!("Invalid response: {}", e)))
}

/// Read a complete response from a stream (until end of stream)
pub fn read_response<R: Read>(reader: R) -> Result<Response> {
    let mut bytes = Vec::new();
    reader.take(MAX_MESSAGE_SIZE + 1).read_to_end(&mut bytes)?;

    if bytes.len() as u64 > MAX_MESSAGE_SIZE {
        return Err(SlateError::Protocol(format!(
            "Response too large: more than {} bytes",
            MAX_MESSAGE_SIZE
        )));
    }

    decode_response(&bytes)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

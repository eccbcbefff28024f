//! Record codec
//!
//! Encoding and decoding of single records.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::error::{Result, SlateError};

/// Header size: key length (4) + value length (4)
pub const HEADER_SIZE: usize = 8;

/// The fixed-size prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Length of the key in bytes
    pub key_len: u32,

    /// Length of the encoded value in bytes
    pub value_len: u32,
}

impl RecordHeader {
    pub fn new(key_len: u32, value_len: u32) -> Self {
        Self { key_len, value_len }
    }

    /// Total on-disk length of the record this header starts
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_len as u64 + self.value_len as u64
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.key_len.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.value_len.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut buf = &bytes[..];
        Self {
            key_len: buf.get_u32(),
            value_len: buf.get_u32(),
        }
    }
}

/// A fully decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Value,
}

/// Serialize a value into its stored JSON form
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Parse the stored JSON form of a value
///
/// `offset` is only used to report where the bad record starts.
pub fn decode_value(offset: u64, bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| SlateError::malformed(offset, format!("value is not valid JSON: {}", e)))
}

/// Encode a key/value pair into one record
///
/// Format: key_len (4) + value_len (4) + key + value
pub fn encode(key: &[u8], value: &Value) -> Result<Bytes> {
    let value_bytes = encode_value(value)?;

    let key_len = u32::try_from(key.len())
        .map_err(|_| SlateError::RecordTooLarge(format!("key of {} bytes", key.len())))?;
    let value_len = u32::try_from(value_bytes.len()).map_err(|_| {
        SlateError::RecordTooLarge(format!("value of {} bytes", value_bytes.len()))
    })?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + key.len() + value_bytes.len());
    buf.put_u32(key_len);
    buf.put_u32(value_len);
    buf.put_slice(key);
    buf.put_slice(&value_bytes);

    Ok(buf.freeze())
}

/// Decode one record from the front of `bytes`
///
/// `offset` is the log position of `bytes[0]` and is only used in errors.
/// Returns the record and the number of bytes it occupied.
pub fn decode(offset: u64, bytes: &[u8]) -> Result<(Record, usize)> {
    if bytes.is_empty() {
        return Err(SlateError::EndOfLog(offset));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SlateError::malformed(
            offset,
            format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            ),
        ));
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = RecordHeader::from_bytes(&header);

    let total_len = header.record_len();
    if (bytes.len() as u64) < total_len {
        return Err(SlateError::malformed(
            offset,
            format!(
                "incomplete payload: expected {} bytes, got {}",
                total_len,
                bytes.len()
            ),
        ));
    }

    let key_end = HEADER_SIZE + header.key_len as usize;
    let total_len = total_len as usize;

    let key = bytes[HEADER_SIZE..key_end].to_vec();
    let value = decode_value(offset, &bytes[key_end..total_len])?;

    Ok((Record { key, value }, total_len))
}

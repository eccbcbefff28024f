//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SlateError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Result of a successful call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error description for ERROR responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    /// Create an OK response carrying a result
    pub fn ok(result: Value) -> Self {
        Self {
            status: Status::Ok,
            result: Some(result),
            message: None,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            result: None,
            message: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            result: None,
            message: Some(message.to_string()),
        }
    }

    /// Convert into the caller-facing outcome
    ///
    /// - OK → `Ok(Some(result))` (a missing result reads as `null`)
    /// - NOT_FOUND → `Ok(None)`
    /// - ERROR → `Err(Server(message))`
    pub fn into_result(self) -> Result<Option<Value>> {
        match self.status {
            Status::Ok => Ok(Some(self.result.unwrap_or(Value::Null))),
            Status::NotFound => Ok(None),
            Status::Error => Err(SlateError::Server(
                self.message
                    .unwrap_or_else(|| "unspecified server error".to_string()),
            )),
        }
    }
}

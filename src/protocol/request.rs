//! Request definitions
//!
//! The JSON object a client sends for every call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client identifier sent by this crate's driver
pub const CLIENT_NAME: &str = "slatekv-rust";

/// A raw request as it travels over the wire
///
/// `method` is an arbitrary string here; it is checked against the closed
/// command set when converted into a [`super::Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Name of the client library
    #[serde(default)]
    pub client: String,

    /// Method to invoke
    pub method: String,

    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,

    /// Target collection, if the method is collection-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Request {
    /// Create a database-level request
    pub fn new(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            client: CLIENT_NAME.to_string(),
            method: method.into(),
            arguments,
            collection: None,
        }
    }

    /// Scope the request to a collection
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

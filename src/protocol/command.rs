//! Command definitions
//!
//! The closed set of operations a server will run. Requests carry free-form
//! method names; anything that does not map onto a variant here is rejected.

use serde_json::Value;

use crate::error::{Result, SlateError};

use super::Request;

/// Command types, one per wire method name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Remove,
    Query,
    Count,
    All,
    Truncate,
    Info,
    Drop,
    DropAll,
    Ping,
}

impl CommandType {
    /// Look up a wire method name
    pub fn from_method(method: &str) -> Option<Self> {
        let command_type = match method {
            "get" => CommandType::Get,
            "set" => CommandType::Set,
            "remove" => CommandType::Remove,
            "query" => CommandType::Query,
            "count" => CommandType::Count,
            "all" => CommandType::All,
            "truncate" => CommandType::Truncate,
            "info" => CommandType::Info,
            "drop" => CommandType::Drop,
            "dropAll" => CommandType::DropAll,
            "ping" => CommandType::Ping,
            _ => return None,
        };
        Some(command_type)
    }

    /// The wire method name
    pub fn method(&self) -> &'static str {
        match self {
            CommandType::Get => "get",
            CommandType::Set => "set",
            CommandType::Remove => "remove",
            CommandType::Query => "query",
            CommandType::Count => "count",
            CommandType::All => "all",
            CommandType::Truncate => "truncate",
            CommandType::Info => "info",
            CommandType::Drop => "drop",
            CommandType::DropAll => "dropAll",
            CommandType::Ping => "ping",
        }
    }
}

/// A validated command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Collection scoped
    // -------------------------------------------------------------------------
    /// Get a value by key
    Get { collection: String, key: String },

    /// Store a value under a key
    Set {
        collection: String,
        key: String,
        value: Value,
    },

    /// Remove a key
    Remove { collection: String, key: String },

    /// All entries whose key matches a case-insensitive pattern
    Query { collection: String, pattern: String },

    /// Number of keys, optionally filtered
    Count {
        collection: String,
        pattern: Option<String>,
        exact: bool,
    },

    /// Every entry of the collection
    All { collection: String },

    /// Remove every key
    Truncate { collection: String },

    /// Key count and file size
    Info { collection: String },

    /// Drop this collection
    Drop { collection: String },

    // -------------------------------------------------------------------------
    // Database scoped
    // -------------------------------------------------------------------------
    /// Name, count and size of every collection
    ListCollections,

    /// Drop a collection by name
    DropCollection { name: String },

    /// Drop every collection
    DropAll,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Remove { .. } => CommandType::Remove,
            Command::Query { .. } => CommandType::Query,
            Command::Count { .. } => CommandType::Count,
            Command::All { .. } | Command::ListCollections => CommandType::All,
            Command::Truncate { .. } => CommandType::Truncate,
            Command::Info { .. } => CommandType::Info,
            Command::Drop { .. } | Command::DropCollection { .. } => CommandType::Drop,
            Command::DropAll => CommandType::DropAll,
            Command::Ping => CommandType::Ping,
        }
    }

    /// The wire method name
    pub fn method(&self) -> &'static str {
        self.command_type().method()
    }

    /// The collection this command targets, if any
    pub fn collection(&self) -> Option<&str> {
        match self {
            Command::Get { collection, .. }
            | Command::Set { collection, .. }
            | Command::Remove { collection, .. }
            | Command::Query { collection, .. }
            | Command::Count { collection, .. }
            | Command::All { collection }
            | Command::Truncate { collection }
            | Command::Info { collection }
            | Command::Drop { collection } => Some(collection),
            Command::ListCollections
            | Command::DropCollection { .. }
            | Command::DropAll
            | Command::Ping => None,
        }
    }

    /// Encode as a wire request
    pub fn into_request(self) -> Request {
        let method = self.method();
        let collection = self.collection().map(str::to_string);

        let arguments = match self {
            Command::Get { key, .. } | Command::Remove { key, .. } => vec![Value::String(key)],
            Command::Set { key, value, .. } => vec![Value::String(key), value],
            Command::Query { pattern, .. } => vec![Value::String(pattern)],
            Command::Count { pattern, exact, .. } => match pattern {
                Some(pattern) => vec![Value::String(pattern), Value::Bool(exact)],
                None => Vec::new(),
            },
            Command::DropCollection { name } => vec![Value::String(name)],
            Command::All { .. }
            | Command::Truncate { .. }
            | Command::Info { .. }
            | Command::Drop { .. }
            | Command::ListCollections
            | Command::DropAll
            | Command::Ping => Vec::new(),
        };

        let request = Request::new(method, arguments);
        match collection {
            Some(collection) => request.with_collection(collection),
            None => request,
        }
    }
}

impl TryFrom<Request> for Command {
    type Error = SlateError;

    /// Validate a wire request against the supported commands
    fn try_from(request: Request) -> Result<Self> {
        let Request {
            method,
            arguments,
            collection,
            ..
        } = request;

        let command_type = CommandType::from_method(&method)
            .ok_or_else(|| SlateError::UnknownMethod(method.clone()))?;
        let args = Arguments {
            method: command_type.method(),
            values: arguments,
        };

        let command = match (command_type, collection) {
            (CommandType::Ping, _) => {
                args.expect_len(0, 0)?;
                Command::Ping
            }
            (CommandType::Get, Some(collection)) => {
                args.expect_len(1, 1)?;
                Command::Get {
                    collection,
                    key: args.key(0)?,
                }
            }
            (CommandType::Set, Some(collection)) => {
                args.expect_len(2, 2)?;
                let key = args.key(0)?;
                let value = args.into_value(1);
                Command::Set {
                    collection,
                    key,
                    value,
                }
            }
            (CommandType::Remove, Some(collection)) => {
                args.expect_len(1, 1)?;
                Command::Remove {
                    collection,
                    key: args.key(0)?,
                }
            }
            (CommandType::Query, Some(collection)) => {
                args.expect_len(1, 1)?;
                Command::Query {
                    collection,
                    pattern: args.string(0)?,
                }
            }
            (CommandType::Count, Some(collection)) => {
                args.expect_len(0, 2)?;
                Command::Count {
                    collection,
                    pattern: args.optional_string(0)?,
                    exact: args.optional_bool(1)?.unwrap_or(false),
                }
            }
            (CommandType::All, Some(collection)) => {
                args.expect_len(0, 0)?;
                Command::All { collection }
            }
            (CommandType::All, None) => {
                args.expect_len(0, 0)?;
                Command::ListCollections
            }
            (CommandType::Truncate, Some(collection)) => {
                args.expect_len(0, 0)?;
                Command::Truncate { collection }
            }
            (CommandType::Info, Some(collection)) => {
                args.expect_len(0, 0)?;
                Command::Info { collection }
            }
            (CommandType::Drop, Some(collection)) => {
                args.expect_len(0, 0)?;
                Command::Drop { collection }
            }
            (CommandType::Drop, None) => {
                args.expect_len(1, 1)?;
                Command::DropCollection {
                    name: args.string(0)?,
                }
            }
            (CommandType::DropAll, None) => {
                args.expect_len(0, 0)?;
                Command::DropAll
            }
            (CommandType::DropAll, Some(_)) => {
                return Err(SlateError::Protocol(
                    "method 'dropAll' does not take a collection".to_string(),
                ))
            }
            (command_type, None) => {
                return Err(SlateError::Protocol(format!(
                    "method '{}' requires a collection",
                    command_type.method()
                )))
            }
        };

        Ok(command)
    }
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Positional request arguments with the method name for error messages
struct Arguments {
    method: &'static str,
    values: Vec<Value>,
}

impl Arguments {
    fn expect_len(&self, min: usize, max: usize) -> Result<()> {
        let len = self.values.len();
        if len < min || len > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(SlateError::Protocol(format!(
                "method '{}' takes {} argument(s), got {}",
                self.method, expected, len
            )));
        }
        Ok(())
    }

    /// A key: strings as-is, numbers in their decimal form
    fn key(&self, i: usize) -> Result<String> {
        match self.values.get(i) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            other => Err(self.type_error(i, "a string or number key", other)),
        }
    }

    fn string(&self, i: usize) -> Result<String> {
        match self.values.get(i) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(self.type_error(i, "a string", other)),
        }
    }

    fn optional_string(&self, i: usize) -> Result<Option<String>> {
        match self.values.get(i) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            other => Err(self.type_error(i, "a string or null", other)),
        }
    }

    fn optional_bool(&self, i: usize) -> Result<Option<bool>> {
        match self.values.get(i) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            other => Err(self.type_error(i, "a boolean", other)),
        }
    }

    /// Take ownership of an argument the caller already length-checked
    fn into_value(mut self, i: usize) -> Value {
        std::mem::take(&mut self.values[i])
    }

    fn type_error(&self, i: usize, expected: &str, got: Option<&Value>) -> SlateError {
        let got = match got {
            Some(value) => value.to_string(),
            None => "nothing".to_string(),
        };
        SlateError::Protocol(format!(
            "method '{}': argument {} must be {}, got {}",
            self.method, i, expected, got
        ))
    }
}

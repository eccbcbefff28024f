//! SlateKV CLI Client
//!
//! Command-line interface for interacting with a SlateKV server.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use slatekv::{Client, Result};

/// SlateKV CLI
#[derive(Parser, Debug)]
#[command(name = "slatekv-cli")]
#[command(about = "CLI for the SlateKV key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    /// Timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        collection: String,
        key: String,
    },

    /// Set a key-value pair (the value is parsed as JSON, else taken as a string)
    Set {
        collection: String,
        key: String,
        value: String,
    },

    /// Remove a key
    Remove {
        collection: String,
        key: String,
    },

    /// Entries whose key matches a case-insensitive regex
    Query {
        collection: String,
        pattern: String,
    },

    /// Count keys, optionally filtered by a pattern
    Count {
        collection: String,
        pattern: Option<String>,

        /// The pattern must match the whole key
        #[arg(long)]
        exact: bool,
    },

    /// Every entry of a collection
    All { collection: String },

    /// Remove every key of a collection
    Truncate { collection: String },

    /// Key count and file size of a collection
    Info { collection: String },

    /// Drop a collection and delete its file
    Drop { collection: String },

    /// List every collection
    Collections,

    /// Drop every collection
    DropAll,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let client = Client::new(args.server).timeout(Duration::from_millis(args.timeout_ms));

    match run(&client, args.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(client: &Client, command: Commands) -> Result<String> {
    let output = match command {
        Commands::Get { collection, key } => match client.collection(collection).get(&key)? {
            Some(entry) => pretty(&entry)?,
            None => "(not found)".to_string(),
        },
        Commands::Set {
            collection,
            key,
            value,
        } => {
            client.collection(collection).set(&key, parse_value(&value))?;
            "OK".to_string()
        }
        Commands::Remove { collection, key } => {
            if client.collection(collection).remove(&key)? {
                "OK".to_string()
            } else {
                "(not found)".to_string()
            }
        }
        Commands::Query {
            collection,
            pattern,
        } => pretty(&client.collection(collection).query(&pattern)?)?,
        Commands::Count {
            collection,
            pattern,
            exact,
        } => client
            .collection(collection)
            .count(pattern.as_deref(), exact)?
            .to_string(),
        Commands::All { collection } => pretty(&client.collection(collection).all()?)?,
        Commands::Truncate { collection } => {
            client.collection(collection).truncate()?;
            "OK".to_string()
        }
        Commands::Info { collection } => pretty(&client.collection(collection).info()?)?,
        Commands::Drop { collection } => {
            client.drop_collection(&collection)?;
            "OK".to_string()
        }
        Commands::Collections => pretty(&client.list_collections()?)?,
        Commands::DropAll => format!("dropped {}", client.drop_all()?),
        Commands::Ping => {
            client.ping()?;
            "PONG".to_string()
        }
    };
    Ok(output)
}

/// Parse a command-line value as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

//! Database Module
//!
//! Registry of every collection living under one root directory.
//!
//! ## Responsibilities
//! - Discover existing collection logs on startup
//! - Create collections lazily (and idempotently) on first access
//! - Drop collections, deleting their files
//! - Execute protocol commands against the right collection

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Collection;
use crate::config::Config;
use crate::error::{Result, SlateError};
use crate::protocol::Command;

/// Shared handle to an open collection
pub type CollectionHandle = Arc<Mutex<Collection>>;

/// One line of the collection listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    pub count: usize,
    pub size: u64,
}

/// A set of named collections stored in one directory
///
/// ## Concurrency:
/// - `collections`: RwLock over the registry (lookups share, create/drop exclusive)
/// - Each collection sits behind its own Mutex, so one operation at a time
///   runs against a given log while other collections stay available
/// - Lock order is registry, then collection. Nothing here takes the
///   registry lock while holding a collection lock.
pub struct Database {
    /// Database configuration
    config: Config,

    /// Open collections by lowercased name
    collections: RwLock<BTreeMap<String, CollectionHandle>>,
}

impl Database {
    /// Open or create a database with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Discover every `*.{file_extension}` log in it
    /// 3. Open each one (scanning it to build its index)
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let mut collections = BTreeMap::new();

        for entry in fs::read_dir(&config.data_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = Self::parse_collection_name(&path, &config.file_extension) else {
                continue;
            };

            match normalize_name(&name) {
                Ok(normalized) if normalized == name => {
                    let collection = Collection::open(name.clone(), &path)?;
                    collections.insert(name, Arc::new(Mutex::new(collection)));
                }
                _ => {
                    tracing::warn!(
                        "Skipping {}: not a valid collection file name",
                        path.display()
                    );
                }
            }
        }

        tracing::info!(
            "Opened database at {} ({} collections)",
            config.data_dir.display(),
            collections.len()
        );

        Ok(Self {
            config,
            collections: RwLock::new(collections),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Get a collection by name, creating it if it does not exist
    ///
    /// Names are case-insensitive; `Users` and `users` are the same collection.
    pub fn collection(&self, name: &str) -> Result<CollectionHandle> {
        let name = normalize_name(name)?;

        if let Some(handle) = self.collections.read().get(&name) {
            return Ok(Arc::clone(handle));
        }

        let mut collections = self.collections.write();

        // Created by another thread between the two locks
        if let Some(handle) = collections.get(&name) {
            return Ok(Arc::clone(handle));
        }

        let path = self.collection_path(&name);
        let handle = Arc::new(Mutex::new(Collection::open(name.clone(), &path)?));
        collections.insert(name, Arc::clone(&handle));

        Ok(handle)
    }

    /// Whether a collection is currently open under `name`
    pub fn contains(&self, name: &str) -> bool {
        match normalize_name(name) {
            Ok(name) => self.collections.read().contains_key(&name),
            Err(_) => false,
        }
    }

    /// Names of all open collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Name, key count and file size of every collection
    pub fn list(&self) -> Result<Vec<CollectionSummary>> {
        let handles: Vec<CollectionHandle> = self.collections.read().values().cloned().collect();

        handles
            .iter()
            .map(|handle| -> Result<CollectionSummary> {
                let mut collection = handle.lock();
                let info = collection.info()?;
                Ok(CollectionSummary {
                    name: collection.name().to_string(),
                    count: info.count,
                    size: info.size,
                })
            })
            .collect()
    }

    /// Drop a collection, deleting its file
    ///
    /// The registry stays write-locked until the file is gone, so a
    /// concurrent `collection(name)` cannot reopen the file about to be
    /// deleted.
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        let name = normalize_name(name)?;

        let mut collections = self.collections.write();
        let handle = collections
            .remove(&name)
            .ok_or_else(|| SlateError::CollectionNotFound(name.clone()))?;

        let mut collection = handle.lock();
        collection.destroy()
    }

    /// Drop every collection; returns how many were dropped
    ///
    /// Keeps going after a failure and reports the first error. The registry
    /// stays write-locked until every file is gone.
    pub fn drop_all(&self) -> Result<usize> {
        let mut collections = self.collections.write();
        let drained = std::mem::take(&mut *collections);
        let total = drained.len();

        let mut first_error = None;
        for (name, handle) in drained {
            let mut collection = handle.lock();
            if let Err(e) = collection.destroy() {
                tracing::warn!("Failed to drop collection '{}': {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        drop(collections);

        match first_error {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }

    /// Execute a protocol command
    ///
    /// A missing key is reported as `KeyNotFound` for both get and remove.
    pub fn execute(&self, command: Command) -> Result<Value> {
        tracing::trace!("Executing {}", command.method());

        match command {
            Command::Ping => Ok(Value::String("pong".to_string())),
            Command::ListCollections => Ok(serde_json::to_value(self.list()?)?),
            Command::DropCollection { name } | Command::Drop { collection: name } => {
                self.drop_collection(&name)?;
                Ok(Value::Bool(true))
            }
            Command::DropAll => Ok(Value::from(self.drop_all()?)),
            Command::Get { collection, key } => self
                .with_collection(&collection, |c| c.get(&key))?
                .ok_or(SlateError::KeyNotFound),
            Command::Set {
                collection,
                key,
                value,
            } => {
                self.with_collection(&collection, |c| c.set(&key, &value))?;
                Ok(Value::Bool(true))
            }
            Command::Remove { collection, key } => {
                if self.with_collection(&collection, |c| c.remove(&key))? {
                    Ok(Value::Bool(true))
                } else {
                    Err(SlateError::KeyNotFound)
                }
            }
            Command::Query {
                collection,
                pattern,
            } => Ok(Value::Array(
                self.with_collection(&collection, |c| c.query(&pattern))?,
            )),
            Command::Count {
                collection,
                pattern,
                exact,
            } => Ok(Value::from(self.with_collection(&collection, |c| {
                c.count(pattern.as_deref(), exact)
            })?)),
            Command::All { collection } => Ok(Value::Array(
                self.with_collection(&collection, |c| c.all())?,
            )),
            Command::Truncate { collection } => {
                self.with_collection(&collection, |c| c.truncate())?;
                Ok(Value::Bool(true))
            }
            Command::Info { collection } => Ok(serde_json::to_value(
                self.with_collection(&collection, |c| c.info())?,
            )?),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// File path of the log for collection `name`
    /// "Users" → "{data_dir}/users.dat"
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(format!(
            "{}.{}",
            name.to_lowercase(),
            self.config.file_extension
        ))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn with_collection<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Collection) -> Result<T>,
    ) -> Result<T> {
        let handle = self.collection(name)?;
        let mut collection = handle.lock();
        f(&mut collection)
    }

    /// "users.dat" → Some("users") when the extension matches
    fn parse_collection_name(path: &Path, extension: &str) -> Option<String> {
        if path.extension()?.to_str()? != extension {
            return None;
        }
        Some(path.file_stem()?.to_str()?.to_string())
    }
}

/// Lowercase a collection name and check it is safe to use as a file name
fn normalize_name(name: &str) -> Result<String> {
    let normalized = name.to_lowercase();
    let valid = !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(normalized)
    } else {
        Err(SlateError::InvalidCollectionName(name.to_string()))
    }
}

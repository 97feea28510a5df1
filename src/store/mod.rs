//! Durable key/value store.
//!
//! This module persists the workbench's state (profiles, history, settings)
//! as a single JSON document on disk. Writes are atomic: the document is
//! written to a temporary file and renamed into place, so a crash mid-write
//! never leaves a half-written store behind. Keys whose name suggests a
//! secret are sealed at rest when the store is opened with a sealing key; see
//! [`secrets`].
//!
//! The store itself returns errors; deciding whether to swallow them is the
//! caller's business. The workbench facade logs and continues for routine
//! persistence, and propagates errors only where the caller explicitly
//! awaited the operation (export/import).

pub mod secrets;

use secrets::{SealError, SecretSealer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Store key holding the profile array.
pub const PROFILES_KEY: &str = "profiles";
/// Store key holding the history array.
pub const HISTORY_KEY: &str = "history";
/// Store key holding the dark mode flag.
pub const DARK_MODE_KEY: &str = "darkMode";
/// Store key holding the mock mode flag.
pub const MOCK_ENABLED_KEY: &str = "mockEnabled";

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Error reading or writing the backing file.
    Io(std::io::Error),
    /// Error serializing or deserializing the document.
    Serialization(serde_json::Error),
    /// Error sealing or opening a secret value.
    Sealing(SealError),
    /// The imported document is not a JSON object.
    InvalidDocument(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "Store I/O error: {}", err),
            StoreError::Serialization(err) => write!(f, "Store serialization error: {}", err),
            StoreError::Sealing(err) => write!(f, "Store sealing error: {}", err),
            StoreError::InvalidDocument(msg) => write!(f, "Invalid store document: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Serialization(err) => Some(err),
            StoreError::Sealing(err) => Some(err),
            StoreError::InvalidDocument(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl From<SealError> for StoreError {
    fn from(err: SealError) -> Self {
        StoreError::Sealing(err)
    }
}

/// A file-backed key/value store holding one JSON document.
///
/// Keys are strings; values are arbitrary JSON. Every mutation persists the
/// whole document atomically. Entries are kept sorted by key so the on-disk
/// document is stable across runs.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    sealer: Option<SecretSealer>,
}

impl FileStore {
    /// Opens a plaintext store at the given path.
    ///
    /// A missing file yields an empty store; an unreadable or corrupted
    /// document is logged and treated as empty rather than blocking the
    /// workbench from starting.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the backing JSON document
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_inner(path.into(), None)
    }

    /// Opens a store that seals secret-named keys under the given 32-byte key.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the backing JSON document
    /// * `key` - 32 bytes of sealing key material
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sealing` if the key has the wrong length.
    pub fn open_sealed(path: impl Into<PathBuf>, key: &[u8]) -> Result<Self, StoreError> {
        let sealer = SecretSealer::new(key)?;
        Self::open_inner(path.into(), Some(sealer))
    }

    fn open_inner(path: PathBuf, sealer: Option<SecretSealer>) -> Result<Self, StoreError> {
        let entries = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                    Ok(map) => map.into_iter().collect(),
                    Err(e) => {
                        log::warn!(
                            "Store document at {} is corrupted ({}); starting empty",
                            path.display(),
                            e
                        );
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    log::warn!(
                        "Could not read store document at {} ({}); starting empty",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries,
            sealer,
        })
    }

    /// Returns the path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all keys currently present, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Retrieves a value by key, opening sealed values transparently.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Fails if the value is sealed and the store has no sealing key, or if
    /// opening the sealed value fails (wrong key, tampered data).
    pub fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let stored = match self.entries.get(key) {
            Some(v) => v,
            None => return Ok(None),
        };

        if let Value::String(s) = stored {
            if secrets::is_sealed(s) {
                let sealer = self.sealer.as_ref().ok_or_else(|| {
                    StoreError::InvalidDocument(format!(
                        "key '{}' is sealed but the store has no sealing key",
                        key
                    ))
                })?;
                let plaintext = sealer.open(s)?;
                let value = serde_json::from_slice(&plaintext)?;
                return Ok(Some(value));
            }
        }

        Ok(Some(stored.clone()))
    }

    /// Retrieves and deserializes a value by key.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the key is absent; a deserialization failure is an
    /// error, not `None`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Stores a value under a key and persists the document.
    ///
    /// Values under secret-named keys are sealed first when a sealer is
    /// configured.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let stored = match &self.sealer {
            Some(sealer) if secrets::is_secret_key(key) => {
                let plaintext = serde_json::to_vec(&value)?;
                Value::String(sealer.seal(&plaintext)?)
            }
            _ => value,
        };

        self.entries.insert(key.to_string(), stored);
        self.persist()
    }

    /// Serializes and stores a value under a key.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_value(value)?)
    }

    /// Removes a key and persists the document. Removing an absent key is a
    /// no-op.
    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Removes every key and persists the now-empty document.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    /// Exports the entire keyspace as one JSON document.
    ///
    /// Sealed values are exported in sealed form, so secrets never leave the
    /// store in plaintext; importing the document into a store opened with
    /// the same key restores access.
    pub fn export(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Replaces the entire keyspace from an exported document and persists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidDocument` if the document is not a JSON
    /// object.
    pub fn import(&mut self, document: Value) -> Result<(), StoreError> {
        let map = match document {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        self.entries = map.into_iter().collect();
        self.persist()
    }

    /// Writes the document to a temporary file and renames it into place.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let document: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let json = serde_json::to_string_pretty(&Value::Object(document))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        drop(temp_file);

        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

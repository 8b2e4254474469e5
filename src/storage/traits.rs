//! Storage traits and error types
//!
//! This module defines the key-value contract shared by the storage backends
//! and the errors they report.

use crate::storage::Namespace;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt value in {namespace}: {message}")]
    Corrupt {
        namespace: Namespace,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn corrupt(namespace: Namespace, message: impl Into<String>) -> Self {
        Self::Corrupt {
            namespace,
            message: message.into(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Separator placed between an existing value and appended data
pub const APPEND_SEPARATOR: char = ' ';

/// A single write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Overwrite (or create) the value under `key`
    Put {
        namespace: Namespace,
        key: String,
        value: String,
    },
    /// Concatenate onto the value under `key`, creating it if absent
    Append {
        namespace: Namespace,
        key: String,
        value: String,
    },
}

/// An ordered group of writes applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, namespace: Namespace, key: impl Into<String>, value: impl Into<String>) {
        self.ops.push(WriteOp::Put {
            namespace,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn append(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.ops.push(WriteOp::Append {
            namespace,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Key-value store with one key space per [`Namespace`]
///
/// Backends use interior mutability so a single store can be shared behind an
/// `Arc` between the indexer (sole writer) and concurrent query readers.
pub trait KeyValueStore: Send + Sync {
    /// Gets the value stored under `key`, if any
    fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value
    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StorageResult<()>;

    /// Appends `value` to the current value (separated by [`APPEND_SEPARATOR`]),
    /// or creates the entry if it does not exist
    fn append_or_create(&self, namespace: Namespace, key: &str, value: &str)
        -> StorageResult<()>;

    /// Returns every entry of a namespace in key order
    fn scan(&self, namespace: Namespace) -> StorageResult<Vec<(String, String)>>;

    /// Counts the entries of a namespace
    fn count(&self, namespace: Namespace) -> StorageResult<usize>;

    /// Applies every write in the batch, or none of them
    fn apply(&self, batch: &WriteBatch) -> StorageResult<()>;

    /// Removes every entry of a namespace
    fn clear(&self, namespace: Namespace) -> StorageResult<()>;

    /// Removes every entry of every namespace
    fn clear_all(&self) -> StorageResult<()> {
        for namespace in Namespace::ALL {
            self.clear(namespace)?;
        }
        Ok(())
    }
}

/// Scans a namespace, skipping `exclude` keys and decoding each value
///
/// # Example
///
/// ```
/// use sumi_index::storage::{codec, scan_all, KeyValueStore, MemoryStore, Namespace};
///
/// let store = MemoryStore::new();
/// store.put(Namespace::UrlMapping, "https://example.com/a", "0").unwrap();
/// let urls = scan_all(&store, Namespace::UrlMapping, &[], |v| {
///     codec::decode_id(Namespace::UrlMapping, v)
/// })
/// .unwrap();
/// assert_eq!(urls["https://example.com/a"], 0);
/// ```
pub fn scan_all<T, F>(
    store: &dyn KeyValueStore,
    namespace: Namespace,
    exclude: &[&str],
    transform: F,
) -> StorageResult<BTreeMap<String, T>>
where
    F: Fn(&str) -> StorageResult<T>,
{
    let mut out = BTreeMap::new();
    for (key, value) in store.scan(namespace)? {
        if exclude.contains(&key.as_str()) {
            continue;
        }
        out.insert(key, transform(&value)?);
    }
    Ok(out)
}

/// Concatenates appended data the way every backend must
pub(crate) fn concat_append(existing: Option<&str>, value: &str) -> String {
    match existing {
        Some(current) if !current.is_empty() => {
            let mut joined = String::with_capacity(current.len() + value.len() + 1);
            joined.push_str(current);
            joined.push(APPEND_SEPARATOR);
            joined.push_str(value);
            joined
        }
        _ => value.to_string(),
    }
}

//! In-memory storage implementation
//!
//! Used by unit tests and for throwaway indexes; mirrors the SQLite backend's
//! ordering and append semantics.

use crate::storage::traits::{concat_append, KeyValueStore, StorageResult, WriteBatch, WriteOp};
use crate::storage::Namespace;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type Table = BTreeMap<String, String>;

/// In-memory storage backend
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Namespace, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_op(tables: &mut HashMap<Namespace, Table>, op: &WriteOp) {
    match op {
        WriteOp::Put {
            namespace,
            key,
            value,
        } => {
            tables
                .entry(*namespace)
                .or_default()
                .insert(key.clone(), value.clone());
        }
        WriteOp::Append {
            namespace,
            key,
            value,
        } => {
            let table = tables.entry(*namespace).or_default();
            let joined = concat_append(table.get(key).map(String::as_str), value);
            table.insert(key.clone(), joined);
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .tables
            .read()
            .get(&namespace)
            .and_then(|table| table.get(key).cloned()))
    }

    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StorageResult<()> {
        self.tables
            .write()
            .entry(namespace)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn append_or_create(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> StorageResult<()> {
        let op = WriteOp::Append {
            namespace,
            key: key.to_string(),
            value: value.to_string(),
        };
        apply_op(&mut self.tables.write(), &op);
        Ok(())
    }

    fn scan(&self, namespace: Namespace) -> StorageResult<Vec<(String, String)>> {
        Ok(self
            .tables
            .read()
            .get(&namespace)
            .map(|table| {
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn count(&self, namespace: Namespace) -> StorageResult<usize> {
        Ok(self
            .tables
            .read()
            .get(&namespace)
            .map(BTreeMap::len)
            .unwrap_or(0))
    }

    fn apply(&self, batch: &WriteBatch) -> StorageResult<()> {
        // one write guard for the whole batch, so readers never see half of it
        let mut tables = self.tables.write();
        for op in batch.ops() {
            apply_op(&mut tables, op);
        }
        Ok(())
    }

    fn clear(&self, namespace: Namespace) -> StorageResult<()> {
        self.tables.write().remove(&namespace);
        Ok(())
    }
}

//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the KeyValueStore trait.

use crate::storage::schema::{initialize_schema, table_for};
use crate::storage::traits::{concat_append, KeyValueStore, StorageResult, WriteBatch, WriteOp};
use crate::storage::Namespace;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn select_value(conn: &Connection, namespace: Namespace, key: &str) -> StorageResult<Option<String>> {
    let sql = format!("SELECT value FROM {} WHERE key = ?1", table_for(namespace));
    let value = conn
        .query_row(&sql, params![key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn upsert_value(conn: &Connection, namespace: Namespace, key: &str, value: &str) -> StorageResult<()> {
    let sql = format!(
        "INSERT INTO {} (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        table_for(namespace)
    );
    conn.execute(&sql, params![key, value])?;
    Ok(())
}

fn append_value(conn: &Connection, namespace: Namespace, key: &str, value: &str) -> StorageResult<()> {
    // read-concatenate-write keeps the separator rule in one place
    let existing = select_value(conn, namespace, key)?;
    let joined = concat_append(existing.as_deref(), value);
    upsert_value(conn, namespace, key, &joined)
}

impl KeyValueStore for SqliteStore {
    fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock();
        select_value(&conn, namespace, key)
    }

    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock();
        upsert_value(&conn, namespace, key, value)
    }

    fn append_or_create(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        append_value(&tx, namespace, key, value)?;
        tx.commit()?;
        Ok(())
    }

    fn scan(&self, namespace: Namespace) -> StorageResult<Vec<(String, String)>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT key, value FROM {} ORDER BY key", table_for(namespace));
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn count(&self, namespace: Namespace) -> StorageResult<usize> {
        let conn = self.conn.lock();
        let sql = format!("SELECT COUNT(*) FROM {}", table_for(namespace));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn apply(&self, batch: &WriteBatch) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        for op in batch.ops() {
            match op {
                WriteOp::Put {
                    namespace,
                    key,
                    value,
                } => upsert_value(&tx, *namespace, key, value)?,
                WriteOp::Append {
                    namespace,
                    key,
                    value,
                } => append_value(&tx, *namespace, key, value)?,
            }
        }

        // dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(())
    }

    fn clear(&self, namespace: Namespace) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(&format!("DELETE FROM {}", table_for(namespace)), [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStore::new_in_memory().is_ok());
    }

    #[test]
    fn test_put_overwrites() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.put(Namespace::UrlMapping, "https://a", "0").unwrap();
        store.put(Namespace::UrlMapping, "https://a", "3").unwrap();

        assert_eq!(
            store.get(Namespace::UrlMapping, "https://a").unwrap(),
            Some("3".to_string())
        );
        assert_eq!(store.count(Namespace::UrlMapping).unwrap(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert_eq!(store.get(Namespace::Info, "0").unwrap(), None);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.put(Namespace::Forward, "0", "comput").unwrap();

        assert_eq!(store.get(Namespace::Info, "0").unwrap(), None);
        assert_eq!(store.count(Namespace::Forward).unwrap(), 1);
        assert_eq!(store.count(Namespace::Info).unwrap(), 0);
    }

    #[test]
    fn test_append_or_create() {
        let store = SqliteStore::new_in_memory().unwrap();
        store
            .append_or_create(Namespace::Inverted, "comput", "0 1 4")
            .unwrap();
        store
            .append_or_create(Namespace::Inverted, "comput", "2 2 1 8")
            .unwrap();

        assert_eq!(
            store.get(Namespace::Inverted, "comput").unwrap(),
            Some("0 1 4 2 2 1 8".to_string())
        );
    }

    #[test]
    fn test_scan_is_key_ordered() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.put(Namespace::WordMapping, "b", "1").unwrap();
        store.put(Namespace::WordMapping, "a", "0").unwrap();

        let entries = store.scan(Namespace::WordMapping).unwrap();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), "0".to_string()),
                ("b".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn test_apply_batch() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut batch = WriteBatch::new();
        batch.put(Namespace::UrlMapping, "https://a", "0");
        batch.append(Namespace::Inverted, "t", "0 1 1");
        batch.append(Namespace::Inverted, "t", "1 1 2");
        store.apply(&batch).unwrap();

        assert_eq!(store.count(Namespace::UrlMapping).unwrap(), 1);
        assert_eq!(
            store.get(Namespace::Inverted, "t").unwrap(),
            Some("0 1 1 1 1 2".to_string())
        );
    }

    #[test]
    fn test_clear_all() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.put(Namespace::UrlMapping, "https://a", "0").unwrap();
        store.put(Namespace::Info, "0", "{}").unwrap();
        store.clear_all().unwrap();

        for namespace in Namespace::ALL {
            assert_eq!(store.count(namespace).unwrap(), 0);
        }
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.put(Namespace::WordMapping, "comput", "0").unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.count(Namespace::WordMapping).unwrap(), 1);
    }
}

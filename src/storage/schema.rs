//! Database schema definitions
//!
//! Every namespace is its own two-column table keyed by text.

use crate::storage::Namespace;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- url -> docId
CREATE TABLE IF NOT EXISTS url_mapping (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- term -> termId
CREATE TABLE IF NOT EXISTS word_mapping (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- docId -> distinct terms
CREATE TABLE IF NOT EXISTS forward (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- term -> posting groups
CREATE TABLE IF NOT EXISTS inverted (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- docId -> page metadata
CREATE TABLE IF NOT EXISTS info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- docId -> child links
CREATE TABLE IF NOT EXISTS parent_child (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Table backing a namespace
///
/// Table names are fixed strings, so interpolating them into SQL is safe.
pub fn table_for(namespace: Namespace) -> &'static str {
    namespace.name()
}

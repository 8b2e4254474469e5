//! Raw namespace dumps as JSON
//!
//! Each namespace is rendered as one object keyed by the stored key, with the
//! value decoded into its natural JSON shape.

use crate::storage::codec::{decode_id, decode_info, decode_links, decode_postings, decode_terms};
use crate::storage::{KeyValueStore, Namespace, StorageResult};
use serde_json::{Map, Value};

/// Decodes every entry of a namespace
pub fn dump_namespace(store: &dyn KeyValueStore, namespace: Namespace) -> StorageResult<Value> {
    let mut out = Map::new();
    for (key, raw) in store.scan(namespace)? {
        let value = match namespace {
            Namespace::UrlMapping | Namespace::WordMapping => {
                Value::from(decode_id(namespace, &raw)?)
            }
            Namespace::Forward => Value::from(decode_terms(&raw)),
            Namespace::Inverted => serde_json::to_value(decode_postings(&raw)?)?,
            Namespace::Info => serde_json::to_value(decode_info(&raw)?)?,
            Namespace::ParentChild => Value::from(decode_links(&raw)?),
        };
        out.insert(key, value);
    }
    Ok(Value::Object(out))
}

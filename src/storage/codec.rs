//! Text encodings for namespace values
//!
//! | Namespace | Encoding |
//! |-----------|----------|
//! | `url_mapping`, `word_mapping` | decimal id |
//! | `forward` | terms joined by one space |
//! | `inverted` | flat integers: `docId count pos₁ … pos_count` groups, space separated |
//! | `info`, `parent_child` | compact JSON |
//!
//! Every `decode_*` accepts exactly what the matching `encode_*` produces, and
//! encoding a decoded value reproduces the original text.

use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::{DocId, DocumentInfo, Namespace, Posting};

/// Encodes a docId or termId
pub fn encode_id(id: u32) -> String {
    id.to_string()
}

/// Decodes a docId or termId
pub fn decode_id(namespace: Namespace, value: &str) -> StorageResult<u32> {
    value
        .parse()
        .map_err(|_| StorageError::corrupt(namespace, format!("expected an id, got '{}'", value)))
}

/// Encodes a forward-index term list
pub fn encode_terms<S: AsRef<str>>(terms: &[S]) -> String {
    terms
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes a forward-index term list; the empty string is the empty list
pub fn decode_terms(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(' ').map(str::to_string).collect()
}

/// Encodes a single posting group: `docId count pos₁ … pos_count`
pub fn encode_posting(posting: &Posting) -> String {
    let mut parts = Vec::with_capacity(posting.positions.len() + 2);
    parts.push(posting.doc_id.to_string());
    parts.push(posting.count().to_string());
    parts.extend(posting.positions.iter().map(u32::to_string));
    parts.join(" ")
}

/// Encodes a full posting list as concatenated groups
pub fn encode_postings(postings: &[Posting]) -> String {
    postings
        .iter()
        .map(encode_posting)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes a posting list
///
/// Fails on non-numeric fields and on a group whose declared count runs past
/// the end of the value.
pub fn decode_postings(value: &str) -> StorageResult<Vec<Posting>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let numbers = value
        .split(' ')
        .map(|field| {
            field.parse::<u32>().map_err(|_| {
                StorageError::corrupt(
                    Namespace::Inverted,
                    format!("non-numeric posting field '{}'", field),
                )
            })
        })
        .collect::<StorageResult<Vec<u32>>>()?;

    let mut postings = Vec::new();
    let mut cursor = 0;
    while cursor < numbers.len() {
        let header = numbers.get(cursor..cursor + 2).ok_or_else(|| {
            StorageError::corrupt(Namespace::Inverted, "truncated posting header")
        })?;
        let doc_id: DocId = header[0];
        let count = header[1] as usize;
        cursor += 2;

        let positions = numbers.get(cursor..cursor + count).ok_or_else(|| {
            StorageError::corrupt(
                Namespace::Inverted,
                format!("posting for doc {} declares {} positions", doc_id, count),
            )
        })?;
        cursor += count;

        postings.push(Posting {
            doc_id,
            positions: positions.to_vec(),
        });
    }

    Ok(postings)
}

/// Encodes document metadata
pub fn encode_info(info: &DocumentInfo) -> StorageResult<String> {
    Ok(serde_json::to_string(info)?)
}

/// Decodes document metadata
pub fn decode_info(value: &str) -> StorageResult<DocumentInfo> {
    serde_json::from_str(value).map_err(|e| StorageError::corrupt(Namespace::Info, e.to_string()))
}

/// Encodes a child-link list
pub fn encode_links(links: &[String]) -> StorageResult<String> {
    Ok(serde_json::to_string(links)?)
}

/// Decodes a child-link list
pub fn decode_links(value: &str) -> StorageResult<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|e| StorageError::corrupt(Namespace::ParentChild, e.to_string()))
}

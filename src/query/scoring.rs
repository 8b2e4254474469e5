//! Vector-space scoring primitives
//!
//! Every function here is pure; the processor supplies the counts read from
//! the store.

use crate::index::stem;

/// Inverse document frequency against a corpus of `n` documents
///
/// Terms absent from the index weigh 1.
pub fn idf(n: f64, document_frequency: usize) -> f64 {
    if document_frequency == 0 {
        1.0
    } else {
        1.0 + (n / document_frequency as f64).ln()
    }
}

/// Frequency of `term` among the query terms
///
/// A phrase adds one to the denominator even when it turns out to be empty.
pub fn query_tf(terms: &[String], term: &str, phrase_given: bool) -> f64 {
    let count = terms.iter().filter(|t| t.as_str() == term).count();
    let total = terms.len() + usize::from(phrase_given);
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Occurrences of a term normalized by the document's token count
pub fn document_tf(count: u32, token_count: u32) -> f64 {
    if token_count == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(token_count)
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// `dot(q, d) / |q| * |d|`
///
/// The document magnitude multiplies rather than divides, which ranks longer
/// vectors higher than a true cosine would. A zero query vector scores 0.
pub fn similarity(query: &[f64], document: &[f64]) -> f64 {
    let q = magnitude(query);
    if q == 0.0 {
        return 0.0;
    }
    dot(query, document) / q * magnitude(document)
}

/// Lowercases a title, splits it on single spaces and stems each piece
pub fn stem_title(title: &str) -> String {
    title
        .to_lowercase()
        .split(' ')
        .map(stem)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bonus for query terms occurring in the stemmed title
///
/// `weight * (weight + matches)` where `matches` counts query terms (with
/// repeats) that are substrings of the title; 0 when nothing matches.
pub fn title_bonus(weight: f64, query_terms: &[String], stemmed_title: &str) -> f64 {
    let matches = query_terms
        .iter()
        .filter(|t| stemmed_title.contains(t.as_str()))
        .count();
    if matches == 0 {
        0.0
    } else {
        weight * (weight + matches as f64)
    }
}

/// Number of position pairs `(x, y)` with `|x - y| == 1`
///
/// Both lists must be ascending.
pub fn adjacency_count(first: &[u32], second: &[u32]) -> u32 {
    first
        .iter()
        .map(|&x| {
            let before = x
                .checked_sub(1)
                .map_or(false, |p| second.binary_search(&p).is_ok());
            let after = second.binary_search(&(x + 1)).is_ok();
            u32::from(before) + u32::from(after)
        })
        .sum()
}

/// Query-side phrase weight: `1 + ln(1 / (words + 1))`
///
/// `words` counts the raw query split on single spaces, so this is negative
/// once the query has two or more words.
pub fn phrase_query_idf(raw_query: &str) -> f64 {
    let words = raw_query.split(' ').count() as f64;
    1.0 + (1.0 / (words + 1.0)).ln()
}

/// Document-side phrase frequency
///
/// `count / (tokens - max(1, count)^(phrase_len - 1))`, or 0 when the phrase
/// never occurs or the denominator is not positive.
pub fn phrase_document_tf(count: u32, token_count: u32, phrase_len: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let exponent = phrase_len.saturating_sub(1) as i32;
    let denominator = f64::from(token_count) - f64::from(count.max(1)).powi(exponent);
    if denominator <= 0.0 {
        0.0
    } else {
        f64::from(count) / denominator
    }
}

/// Document-side phrase rarity: `1 + ln(docs / matching)`
///
/// None when no document contains the phrase.
pub fn phrase_document_idf(documents: usize, matching: usize) -> Option<f64> {
    if matching == 0 {
        None
    } else {
        Some(1.0 + (documents as f64 / matching as f64).ln())
    }
}

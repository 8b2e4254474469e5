//! Tokenization and stemming shared by indexing and querying

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[A-Za-z0-9]{2,20}").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Splits text into lowercase alphanumeric runs of 2 to 20 characters
///
/// Longer runs are cut into consecutive 20-character tokens; single
/// characters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Stems one lowercase word
pub fn stem(word: &str) -> String {
    STEMMER.stem(word).into_owned()
}

/// Stems every word, keeping order and duplicates
pub fn stem_all<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words.iter().map(|w| stem(w.as_ref())).collect()
}

/// Tokenizes then stems free text
pub fn analyze(text: &str) -> Vec<String> {
    stem_all(&tokenize(text))
}

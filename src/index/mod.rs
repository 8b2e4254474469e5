//! Index construction
//!
//! This module turns parsed pages into the forward and inverted index:
//! - Tokenization and stemming shared with the query side
//! - Per-document positional tables
//! - The sequential indexer that assigns docIds and termIds

mod indexer;
mod positions;
mod tokenizer;

pub use indexer::{IndexOutcome, IndexReport, Indexer};
pub use positions::PositionTable;
pub use tokenizer::{analyze, stem, stem_all, tokenize};

//! Output module for reports over the index
//!
//! This module handles:
//! - The per-document spider report
//! - Raw namespace dumps for diagnostics
//! - Index statistics

mod dump;
mod report;
pub mod stats;

pub use dump::dump_namespace;
pub use report::{
    format_spider_entry, load_spider_entries, render_spider_report, write_spider_report,
    SpiderEntry, ENTRY_SEPARATOR,
};
pub use stats::{load_statistics, print_statistics, IndexStatistics};

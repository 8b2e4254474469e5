//! Sumi-Index main entry point
//!
//! This is the command-line interface for the Sumi-Index search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_index::config::{load_config_with_hash, Config};
use sumi_index::output::{
    dump_namespace, load_spider_entries, load_statistics, print_statistics, render_spider_report,
    write_spider_report,
};
use sumi_index::{run_crawl, KeyValueStore, Namespace, QueryProcessor, SqliteStore};
use tracing_subscriber::EnvFilter;

/// Sumi-Index: a small positional search engine
///
/// Sumi-Index crawls the pages under one site prefix, builds a positional
/// forward and inverted index, and ranks pages for free-text and phrase
/// queries.
#[derive(Parser, Debug)]
#[command(name = "sumi-index")]
#[command(version = "1.0.0")]
#[command(about = "A small positional search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover URLs from the seed and index them
    Crawl {
        /// Clear every namespace before crawling
        #[arg(long)]
        fresh: bool,
    },

    /// Rank indexed pages for a query
    Query {
        /// Free-text query
        query: String,

        /// Phrase whose first two words should appear next to each other
        #[arg(long)]
        phrase: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the per-document report
    Spider {
        /// Report file (stdout when omitted)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print one namespace as JSON
    Dump {
        /// url_mapping, word_mapping, forward, inverted, info or parent_child
        #[arg(value_name = "NAMESPACE")]
        namespace: String,
    },

    /// Show entry counts per namespace
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let store = open_store(&config)?;

    match cli.command {
        Command::Crawl { fresh } => handle_crawl(&config, store, fresh).await,
        Command::Query {
            query,
            phrase,
            json,
        } => handle_query(&config, store, &query, phrase.as_deref(), json).await,
        Command::Spider { output } => handle_spider(store.as_ref(), output.as_deref()),
        Command::Dump { namespace } => handle_dump(store.as_ref(), &namespace),
        Command::Stats => {
            println!("Database: {}\n", config.storage.database_path);
            print_statistics(&load_statistics(store.as_ref())?);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_index=info,warn"),
            1 => EnvFilter::new("sumi_index=debug,info"),
            2 => EnvFilter::new("sumi_index=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let path = Path::new(&config.storage.database_path);
    let store = SqliteStore::new(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    fresh: bool,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (clearing the existing index)");
    } else {
        tracing::info!("Starting crawl (already indexed URLs are kept)");
    }
    tracing::info!(
        "Seed: {}, prefix: {}, URL limit: {}",
        config.crawler.seed_url,
        config.crawler.link_prefix,
        config.crawler.url_limit
    );

    match run_crawl(config, store, fresh).await {
        Ok(report) => {
            println!(
                "Indexed {} of {} discovered URLs ({} documents in the index)",
                report.index.indexed, report.discovered, report.total_documents
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

async fn handle_query(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    query: &str,
    phrase: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let processor = QueryProcessor::new(store, config);
    let results = processor.search(query, phrase).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results for \"{}\"", query);
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!("{:>3}. {:.4}  {}", rank + 1, result.score, result.title);
        println!("     {}", result.url);
        println!("     {}, {}", result.date, result.size);
    }
    Ok(())
}

fn handle_spider(store: &dyn KeyValueStore, output: Option<&Path>) -> anyhow::Result<()> {
    let entries = load_spider_entries(store)?;
    match output {
        Some(path) => {
            write_spider_report(&entries, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Report for {} documents written to: {}", entries.len(), path.display());
        }
        None => print!("{}", render_spider_report(&entries)),
    }
    Ok(())
}

fn handle_dump(store: &dyn KeyValueStore, name: &str) -> anyhow::Result<()> {
    let namespace = Namespace::from_name(name).with_context(|| {
        let known: Vec<_> = Namespace::ALL.iter().map(|ns| ns.name()).collect();
        format!("Unknown namespace '{}' (expected one of: {})", name, known.join(", "))
    })?;
    let value = dump_namespace(store, namespace)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

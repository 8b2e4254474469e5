//! Breadth-first link discovery
//!
//! Builds the ordered worklist the indexer consumes. The list starts with the
//! seed; each pass expands the next unexpanded URL and appends its unseen
//! links until the list holds `limit` URLs or nothing is left to expand.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::canonical_url;
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

/// Discovers up to `limit` URLs reachable from `seed` under the link prefix
pub async fn discover_links(fetcher: &PageFetcher, seed: &str, limit: usize) -> Vec<String> {
    let seed = canonical_url(seed);
    tracing::info!("Discovering up to {} URLs from {}", limit, seed);

    let urls = walk(seed, limit, |url| async move { fetcher.fetch_links(&url).await }).await;

    tracing::info!("Discovered {} URLs", urls.len());
    urls
}

/// Runs the discovery walk with a caller-supplied expansion step
///
/// # Invariants
///
/// - The result never exceeds `limit` entries and holds no duplicates
/// - Entries appear in first-seen order
/// - A URL whose expansion fails is removed and never re-added
pub async fn walk<F, Fut, E>(seed: String, limit: usize, mut expand: F) -> Vec<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<String>, E>>,
    E: Display,
{
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(seed.clone());
    let mut urls = vec![seed];
    let mut idx = 0;

    while urls.len() < limit && idx < urls.len() {
        let url = urls[idx].clone();

        match expand(url.clone()).await {
            Ok(links) => {
                let before = urls.len();
                for link in links {
                    if urls.len() >= limit {
                        break;
                    }
                    if seen.insert(link.clone()) {
                        urls.push(link);
                    }
                }
                tracing::debug!("Expanded {}: {} new URLs", url, urls.len() - before);
                idx += 1;
            }
            Err(e) => {
                // the next unexpanded URL shifts into `idx`
                tracing::warn!("Dropping {} from discovery: {}", url, e);
                urls.remove(idx);
            }
        }
    }

    urls
}

//! Query evaluation
//!
//! A search runs in three stages, each a group of concurrent blocking reads
//! joined before the next begins:
//!
//! 1. postings for every distinct query and phrase term, alongside the
//!    document metadata scan
//! 2. scoring (in memory, no reads)
//! 3. url, forward terms, keyword frequencies and child links for each
//!    ranked document

use crate::config::{Config, IdfBase, QueryConfig};
use crate::index::analyze;
use crate::query::scoring::{
    adjacency_count, document_tf, idf, phrase_document_idf, phrase_document_tf, phrase_query_idf,
    query_tf, similarity, stem_title, title_bonus,
};
use crate::query::SearchResult;
use crate::storage::codec::{decode_id, decode_info, decode_links, decode_postings, decode_terms};
use crate::storage::{
    scan_all, DocId, DocumentInfo, KeyValueStore, Namespace, Posting, StorageError, StorageResult,
};
use crate::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

type PostingTable = HashMap<String, HashMap<DocId, Vec<u32>>>;

/// Ranks indexed documents for free-text and phrase queries
pub struct QueryProcessor {
    store: Arc<dyn KeyValueStore>,
    config: QueryConfig,
    url_limit: usize,
}

/// Per-document details fetched after ranking
struct Details {
    keyword_frequency: BTreeMap<String, u32>,
    child_links: Vec<String>,
}

impl QueryProcessor {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self::with_settings(store, config.query.clone(), config.crawler.url_limit)
    }

    pub fn with_settings(store: Arc<dyn KeyValueStore>, config: QueryConfig, url_limit: usize) -> Self {
        Self {
            store,
            config,
            url_limit,
        }
    }

    /// Returns at most `query-limit` documents with a positive score, best first
    ///
    /// Equal scores keep docId order. A query without any indexed term, or
    /// with no terms at all, returns nothing.
    pub async fn search(&self, query: &str, phrase: Option<&str>) -> Result<Vec<SearchResult>> {
        let terms = analyze(query);
        if terms.is_empty() {
            tracing::debug!("Query {:?} has no terms", query);
            return Ok(Vec::new());
        }

        let phrase_terms = phrase.map(analyze).unwrap_or_default();
        let phrase_pair = match phrase_terms.as_slice() {
            [first, second, ..] => Some((first.clone(), second.clone())),
            _ => None,
        };

        let mut wanted: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for term in terms.iter().chain(phrase_pair.iter().flat_map(|(a, b)| [a, b])) {
            if seen.insert(term.as_str()) {
                wanted.push(term.clone());
            }
        }

        let (postings, documents) =
            tokio::try_join!(self.load_postings(wanted), self.load_documents())?;

        if !terms.iter().any(|t| postings.contains_key(t)) {
            tracing::debug!("No term of {:?} is indexed", query);
            return Ok(Vec::new());
        }

        let mut scores = self.base_scores(&terms, phrase.is_some(), &postings, &documents);

        if let Some((first, second)) = &phrase_pair {
            let phrase_scores = phrase_scores(
                query,
                first,
                second,
                phrase_terms.len(),
                &postings,
                &documents,
            );
            for (score, extra) in scores.iter_mut().zip(phrase_scores) {
                score.1 += extra;
            }
        }

        let ranked = rank(scores, self.config.query_limit);
        tracing::debug!("Query {:?} ranked {} documents", query, ranked.len());

        self.load_results(ranked, &documents).await
    }

    /// Vector similarity plus title bonus for every document, in docId order
    fn base_scores(
        &self,
        terms: &[String],
        phrase_given: bool,
        postings: &PostingTable,
        documents: &BTreeMap<DocId, DocumentInfo>,
    ) -> Vec<(DocId, f64)> {
        let n = match self.config.idf_base {
            IdfBase::UrlLimit => self.url_limit as f64,
            IdfBase::IndexedDocuments => documents.len() as f64,
        };

        let idfs: Vec<f64> = terms
            .iter()
            .map(|t| idf(n, postings.get(t).map_or(0, HashMap::len)))
            .collect();
        let query_vector: Vec<f64> = terms
            .iter()
            .zip(&idfs)
            .map(|(t, w)| w * query_tf(terms, t, phrase_given))
            .collect();

        documents
            .iter()
            .map(|(&doc_id, info)| {
                let document_vector: Vec<f64> = terms
                    .iter()
                    .zip(&idfs)
                    .map(|(t, w)| {
                        let count = postings
                            .get(t)
                            .and_then(|docs| docs.get(&doc_id))
                            .map_or(0, |p| p.len() as u32);
                        w * document_tf(count, info.token_count)
                    })
                    .collect();

                let score = similarity(&query_vector, &document_vector)
                    + title_bonus(
                        self.config.title_match_weight,
                        terms,
                        &stem_title(&info.title),
                    );
                (doc_id, score)
            })
            .collect()
    }

    async fn load_postings(&self, terms: Vec<String>) -> Result<PostingTable> {
        let mut tasks = JoinSet::new();
        for term in terms {
            let store = self.store.clone();
            tasks.spawn_blocking(move || -> StorageResult<(String, Option<Vec<Posting>>)> {
                let postings = match store.get(Namespace::Inverted, &term)? {
                    Some(raw) => Some(decode_postings(&raw)?),
                    None => None,
                };
                Ok((term, postings))
            });
        }

        let mut table = PostingTable::new();
        while let Some(joined) = tasks.join_next().await {
            let (term, postings) = joined??;
            if let Some(postings) = postings.filter(|p| !p.is_empty()) {
                let by_doc = postings
                    .into_iter()
                    .map(|p| (p.doc_id, p.positions))
                    .collect();
                table.insert(term, by_doc);
            }
        }
        Ok(table)
    }

    async fn load_documents(&self) -> Result<BTreeMap<DocId, DocumentInfo>> {
        let store = self.store.clone();
        let documents = tokio::task::spawn_blocking(
            move || -> StorageResult<BTreeMap<DocId, DocumentInfo>> {
                let raw = scan_all(store.as_ref(), Namespace::Info, &[], decode_info)?;
                raw.into_iter()
                    .map(|(key, info)| Ok((decode_id(Namespace::Info, &key)?, info)))
                    .collect()
            },
        )
        .await??;
        Ok(documents)
    }

    async fn load_urls(&self) -> Result<HashMap<DocId, String>> {
        let store = self.store.clone();
        let urls = tokio::task::spawn_blocking(move || -> StorageResult<HashMap<DocId, String>> {
            let raw = scan_all(store.as_ref(), Namespace::UrlMapping, &[], |v| {
                decode_id(Namespace::UrlMapping, v)
            })?;
            Ok(raw.into_iter().map(|(url, id)| (id, url)).collect())
        })
        .await??;
        Ok(urls)
    }

    async fn load_details(&self, ranked: &[(DocId, f64)]) -> Result<Vec<Details>> {
        let mut tasks = JoinSet::new();
        for (rank, &(doc_id, _)) in ranked.iter().enumerate() {
            let store = self.store.clone();
            tasks.spawn_blocking(move || -> StorageResult<(usize, Details)> {
                Ok((rank, read_details(store.as_ref(), doc_id)?))
            });
        }

        let mut slots: Vec<Option<Details>> = (0..ranked.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (rank, details) = joined??;
            slots[rank] = Some(details);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    async fn load_results(
        &self,
        ranked: Vec<(DocId, f64)>,
        documents: &BTreeMap<DocId, DocumentInfo>,
    ) -> Result<Vec<SearchResult>> {
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let (urls, details) = tokio::try_join!(self.load_urls(), self.load_details(&ranked))?;

        let mut results = Vec::with_capacity(ranked.len());
        for ((doc_id, score), details) in ranked.into_iter().zip(details) {
            let missing = |ns: Namespace| {
                StorageError::corrupt(ns, format!("document {} has no entry", doc_id))
            };
            let info = documents
                .get(&doc_id)
                .ok_or_else(|| missing(Namespace::Info))?;
            let url = urls
                .get(&doc_id)
                .cloned()
                .ok_or_else(|| missing(Namespace::UrlMapping))?;

            results.push(SearchResult {
                url,
                title: info.title.clone(),
                date: info.date.clone(),
                size: info.size,
                keyword_frequency: details.keyword_frequency,
                child_links: details.child_links,
                score,
            });
        }
        Ok(results)
    }
}

/// Reads a document's forward terms with their counts, and its child links
fn read_details(store: &dyn KeyValueStore, doc_id: DocId) -> StorageResult<Details> {
    let key = doc_id.to_string();

    let terms = store
        .get(Namespace::Forward, &key)?
        .map(|raw| decode_terms(&raw))
        .unwrap_or_default();

    let mut keyword_frequency = BTreeMap::new();
    for term in terms {
        let count = match store.get(Namespace::Inverted, &term)? {
            Some(raw) => decode_postings(&raw)?
                .iter()
                .find(|p| p.doc_id == doc_id)
                .map_or(0, Posting::count),
            None => 0,
        };
        keyword_frequency.insert(term, count);
    }

    let child_links = match store.get(Namespace::ParentChild, &key)? {
        Some(raw) => decode_links(&raw)?,
        None => Vec::new(),
    };

    Ok(Details {
        keyword_frequency,
        child_links,
    })
}

/// Phrase contribution for every document, in docId order
///
/// Only the first two phrase terms are matched: a document's phrase count is
/// the number of their position pairs one apart. All zeros when no document
/// contains the pair.
fn phrase_scores(
    query: &str,
    first: &str,
    second: &str,
    phrase_len: usize,
    postings: &PostingTable,
    documents: &BTreeMap<DocId, DocumentInfo>,
) -> Vec<f64> {
    let positions = |term: &str, doc_id: DocId| {
        postings
            .get(term)
            .and_then(|docs| docs.get(&doc_id))
            .map(Vec::as_slice)
    };

    let counts: Vec<u32> = documents
        .keys()
        .map(|&doc_id| match (positions(first, doc_id), positions(second, doc_id)) {
            (Some(a), Some(b)) => adjacency_count(a, b),
            _ => 0,
        })
        .collect();

    let matching = counts.iter().filter(|&&c| c > 0).count();
    let document_idf = match phrase_document_idf(documents.len(), matching) {
        Some(w) => w,
        None => return vec![0.0; documents.len()],
    };

    let query_vector = [phrase_query_idf(query)];
    documents
        .values()
        .zip(counts)
        .map(|(info, count)| {
            let weight = phrase_document_tf(count, info.token_count, phrase_len) * document_idf;
            similarity(&query_vector, &[weight])
        })
        .collect()
}

/// Drops non-positive scores, sorts best first (stable) and truncates
fn rank(mut scores: Vec<(DocId, f64)>, limit: usize) -> Vec<(DocId, f64)> {
    scores.retain(|(_, s)| s.is_finite() && *s > 0.0);
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(limit);
    scores
}

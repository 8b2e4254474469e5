//! Sequential indexing pipeline
//!
//! Documents are processed strictly one after another: a page is fetched,
//! all of its index writes are applied as one batch, and only then does the
//! next fetch begin. Ids come from the store itself:
//!
//! - docId = number of entries in `url_mapping`
//! - termId = number of entries in `word_mapping`
//!
//! so re-opening an existing index continues the numbering from whatever was
//! persisted, and a document that fails to fetch or store consumes nothing.

use crate::crawler::{PageFetcher, ParsedPage};
use crate::index::positions::PositionTable;
use crate::index::tokenizer::stem_all;
use crate::storage::codec::{decode_id, encode_id, encode_info, encode_links, encode_posting, encode_terms};
use crate::storage::{
    DocId, DocumentInfo, KeyValueStore, Namespace, Posting, StorageResult, TermId, WriteBatch,
};
use std::sync::Arc;

/// What happened to one URL of the worklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Stored under a freshly assigned docId
    Indexed(DocId),
    /// The URL was already in the index under this docId
    AlreadyIndexed(DocId),
    /// The page could not be fetched
    FetchFailed,
    /// The store failed twice while looking up or writing the document
    StoreFailed,
}

/// Totals for one indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub already_indexed: usize,
    pub fetch_failed: usize,
    pub store_failed: usize,
}

impl IndexReport {
    fn record(&mut self, outcome: IndexOutcome) {
        match outcome {
            IndexOutcome::Indexed(_) => self.indexed += 1,
            IndexOutcome::AlreadyIndexed(_) => self.already_indexed += 1,
            IndexOutcome::FetchFailed => self.fetch_failed += 1,
            IndexOutcome::StoreFailed => self.store_failed += 1,
        }
    }
}

/// Sole writer of the index during a crawl
pub struct Indexer {
    store: Arc<dyn KeyValueStore>,
}

impl Indexer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Indexes every URL of the worklist in order
    pub async fn index_all(&self, fetcher: &PageFetcher, urls: &[String]) -> IndexReport {
        let mut report = IndexReport::default();
        let total = urls.len().max(1);

        for (idx, url) in urls.iter().enumerate() {
            let outcome = self.process_url(fetcher, url).await;
            report.record(outcome);

            if let IndexOutcome::Indexed(doc_id) = outcome {
                tracing::info!(
                    "({}%) Processed {} as doc {}",
                    ((idx + 1) * 100) / total,
                    url,
                    doc_id
                );
            }
        }

        report
    }

    /// Fetches and stores a single URL
    ///
    /// Every failure is reported through the outcome, so one bad URL never
    /// stops the pass.
    pub async fn process_url(&self, fetcher: &PageFetcher, url: &str) -> IndexOutcome {
        match self.lookup_with_retry(url) {
            Ok(Some(doc_id)) => {
                tracing::debug!("Skipping {}: already indexed as doc {}", url, doc_id);
                return IndexOutcome::AlreadyIndexed(doc_id);
            }
            Ok(None) => {}
            Err(outcome) => return outcome,
        }

        let page = match fetcher.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                return IndexOutcome::FetchFailed;
            }
        };

        self.store_with_retry(url, &page)
    }

    fn existing_doc_id(&self, url: &str) -> StorageResult<Option<DocId>> {
        self.store
            .get(Namespace::UrlMapping, url)?
            .map(|existing| decode_id(Namespace::UrlMapping, &existing))
            .transpose()
    }

    /// Looks up the url mapping, retrying once if the store fails
    fn lookup_with_retry(&self, url: &str) -> Result<Option<DocId>, IndexOutcome> {
        self.existing_doc_id(url).or_else(|first| {
            tracing::warn!("Lookup failed for {}, retrying once: {}", url, first);
            self.existing_doc_id(url).map_err(|second| {
                tracing::error!("Skipping {}: lookup failed twice: {}", url, second);
                IndexOutcome::StoreFailed
            })
        })
    }

    /// Stores a document, retrying once if the store fails
    fn store_with_retry(&self, url: &str, page: &ParsedPage) -> IndexOutcome {
        match self.store_document(url, page) {
            Ok(doc_id) => IndexOutcome::Indexed(doc_id),
            Err(first) => {
                tracing::warn!("Store failed for {}, retrying once: {}", url, first);
                match self.store_document(url, page) {
                    Ok(doc_id) => IndexOutcome::Indexed(doc_id),
                    Err(second) => {
                        tracing::error!("Skipping {}: store failed twice: {}", url, second);
                        IndexOutcome::StoreFailed
                    }
                }
            }
        }
    }

    /// Writes every namespace entry for one parsed page as a single batch
    ///
    /// # Write order
    ///
    /// 1. url → docId
    /// 2. docId → child links
    /// 3. docId → metadata (title, date, size, token count)
    /// 4. docId → distinct terms
    /// 5. per distinct term: term → termId (first sighting only), then the
    ///    posting `(docId, count, positions…)` appended to the term's list
    pub fn store_document(&self, url: &str, page: &ParsedPage) -> StorageResult<DocId> {
        let doc_id = self.store.count(Namespace::UrlMapping)? as DocId;
        let doc_key = encode_id(doc_id);

        let terms = stem_all(&page.tokens);
        let table = PositionTable::from_terms(&terms);

        let info = DocumentInfo {
            title: page.title.clone(),
            date: page.date.clone(),
            size: page.size,
            token_count: page.tokens.len() as u32,
        };

        let mut batch = WriteBatch::new();
        batch.put(Namespace::UrlMapping, url, doc_key.as_str());
        batch.put(Namespace::ParentChild, doc_key.as_str(), encode_links(&page.links)?);
        batch.put(Namespace::Info, doc_key.as_str(), encode_info(&info)?);
        batch.put(Namespace::Forward, doc_key.as_str(), encode_terms(table.terms()));

        let mut next_term_id = self.store.count(Namespace::WordMapping)? as TermId;
        for (term, positions) in table.iter() {
            if self.store.get(Namespace::WordMapping, term)?.is_none() {
                batch.put(Namespace::WordMapping, term, encode_id(next_term_id));
                next_term_id += 1;
            }

            let posting = Posting {
                doc_id,
                positions: positions.to_vec(),
            };
            batch.append(Namespace::Inverted, term, encode_posting(&posting));
        }

        self.store.apply(&batch)?;
        tracing::debug!(
            "Stored doc {} ({} tokens, {} distinct terms, {} links)",
            doc_id,
            info.token_count,
            table.len(),
            page.links.len()
        );

        Ok(doc_id)
    }
}

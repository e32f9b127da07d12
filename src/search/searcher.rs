//! Parallel multi-query search
//!
//! One request per query, all in flight at once, joined before merging.
//! A failing request only loses its own results.

use serde_json::json;
use std::sync::Arc;

use super::merge::{documents_from_hits, merge_partials};
use super::tavily::{SearchError, SearchRequest, SearchTransport};
use super::{DocumentMap, SearchCondition, SearchOutcome};
use crate::config::SearchConfig;
use crate::status::{NoopSink, Status, StatusSink, StatusUpdate};

/// Queries with fewer words are never sent
pub const MIN_QUERY_WORDS: usize = 3;

/// Fan-out/fan-in searcher over a [`SearchTransport`]
pub struct ParallelSearcher {
    transport: Arc<dyn SearchTransport>,
    config: SearchConfig,
    sink: Arc<dyn StatusSink>,
}

impl ParallelSearcher {
    pub fn new(transport: Arc<dyn SearchTransport>, config: SearchConfig) -> Self {
        Self {
            transport,
            config,
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether a query has enough words to be searched
    pub fn is_searchable(query: &str) -> bool {
        query.split_whitespace().count() >= MIN_QUERY_WORDS
    }

    /// Run one search round over `queries`
    pub async fn search(&self, queries: &[String]) -> SearchOutcome {
        self.notify(
            StatusUpdate::new(Status::Processing, "Using Tavily search...").with_result(json!({
                "step": "Searching",
                "total_queries": queries.len(),
            })),
        );

        let valid: Vec<&str> = queries
            .iter()
            .map(String::as_str)
            .filter(|q| Self::is_searchable(q))
            .collect();

        if valid.len() < queries.len() {
            tracing::debug!(
                rejected = queries.len() - valid.len(),
                "dropped queries shorter than {} words",
                MIN_QUERY_WORDS
            );
        }

        if valid.is_empty() {
            tracing::warn!("No valid queries to search");
            self.notify_complete(0, 0);
            return SearchOutcome {
                condition: Some(SearchCondition::NoValidQueries),
                ..SearchOutcome::default()
            };
        }

        let outcomes = futures::future::join_all(valid.iter().map(|q| self.search_one(q))).await;

        let mut partials: Vec<DocumentMap> = Vec::with_capacity(outcomes.len());
        let mut failed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(docs) => partials.push(docs),
                Err(_) => failed += 1,
            }
        }

        let documents = merge_partials(partials);
        let condition = if documents.is_empty() {
            tracing::warn!("Search round produced no documents");
            Some(SearchCondition::NoResultsFound)
        } else {
            None
        };

        tracing::info!(
            documents = documents.len(),
            dispatched = valid.len(),
            failed,
            "search round complete"
        );
        self.notify_complete(documents.len(), valid.len());

        SearchOutcome {
            documents,
            dispatched: valid.len(),
            failed,
            condition,
        }
    }

    async fn search_one(&self, query: &str) -> Result<DocumentMap, SearchError> {
        self.notify(
            StatusUpdate::new(Status::QuerySearching, format!("Searching: {}", query))
                .with_result(json!({"step": "Searching", "query": query})),
        );

        let request = SearchRequest {
            query: query.to_string(),
            scope: self.config.scope,
            max_results: self.config.max_results,
            depth: self.config.depth,
        };

        match self.transport.search(&request).await {
            Ok(hits) => {
                let docs = documents_from_hits(query, hits);
                self.notify(
                    StatusUpdate::new(
                        Status::QuerySearched,
                        format!("Found {} results for: {}", docs.len(), query),
                    )
                    .with_result(json!({
                        "step": "Searching",
                        "query": query,
                        "results_count": docs.len(),
                    })),
                );
                Ok(docs)
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "search request failed");
                self.notify(
                    StatusUpdate::new(Status::QueryError, format!("Search failed for: {}", query))
                        .with_result(json!({
                            "step": "Searching",
                            "query": query,
                            "error": e.to_string(),
                        })),
                );
                Err(e)
            }
        }
    }

    fn notify_complete(&self, total_documents: usize, queries_processed: usize) {
        self.notify(
            StatusUpdate::new(
                Status::SearchComplete,
                format!("Search completed with {} documents found", total_documents),
            )
            .with_result(json!({
                "step": "Searching",
                "total_documents": total_documents,
                "queries_processed": queries_processed,
            })),
        );
    }

    fn notify(&self, update: StatusUpdate) {
        self.sink.notify(update.into());
    }
}

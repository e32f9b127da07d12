//! Search module
//!
//! Web search transport, parallel multi-query search and result merging.

mod merge;
mod searcher;
pub mod tavily;

pub use merge::{clean_title, documents_from_hits, merge_partials, normalize_title};
pub use searcher::{ParallelSearcher, MIN_QUERY_WORDS};
pub use tavily::{SearchError, SearchHit, SearchRequest, SearchTransport, TavilyClient};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source tag stored on every web search result
pub const WEB_SEARCH_SOURCE: &str = "web_search";

/// A search result, keyed by URL in a [`DocumentMap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Cleaned title; empty when it still needs enrichment
    pub title: String,
    /// Result content, never empty
    pub content: String,
    /// Query that produced this result
    pub query: String,
    /// Source URL
    pub url: String,
    /// Source tag
    pub source: String,
    /// Relevance score reported by the search API
    #[serde(default)]
    pub score: f64,
    /// Full page content, filled by downstream enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl SearchResult {
    /// Create a web search result
    pub fn new(url: String, title: String, content: String, query: String, score: f64) -> Self {
        Self {
            title,
            content,
            query,
            url,
            source: WEB_SEARCH_SOURCE.to_string(),
            score,
            raw_content: None,
        }
    }
}

/// URL → result mapping for one search round
pub type DocumentMap = HashMap<String, SearchResult>;

/// Recoverable, observable end states of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCondition {
    /// Every query was rejected before dispatch
    NoValidQueries,
    /// Requests ran but nothing survived the merge
    NoResultsFound,
}

/// Outcome of one search round
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Merged documents
    pub documents: DocumentMap,
    /// Number of requests issued
    pub dispatched: usize,
    /// Number of requests that failed
    pub failed: usize,
    /// Set when the round ended in a recoverable empty state
    pub condition: Option<SearchCondition>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_creation() {
        let result = SearchResult::new(
            "https://acme.com/about".to_string(),
            "About Acme".to_string(),
            "Acme builds robots".to_string(),
            "Acme Corp overview 2024".to_string(),
            0.85,
        );
        assert_eq!(result.source, WEB_SEARCH_SOURCE);
        assert!((result.score - 0.85).abs() < 1e-9);
        assert!(result.raw_content.is_none());
    }

    #[test]
    fn test_search_result_serialization_skips_raw_content() {
        let result = SearchResult::new(
            "https://acme.com".to_string(),
            String::new(),
            "content".to_string(),
            "q".to_string(),
            0.0,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("raw_content").is_none());
        assert_eq!(json["source"], "web_search");

        let back: SearchResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_outcome_default_is_empty() {
        let outcome = SearchOutcome::default();
        assert!(outcome.is_empty());
        assert!(outcome.condition.is_none());
    }
}

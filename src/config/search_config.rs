//! Search configuration structures
//!
//! Defines the search scopes, depth and per-round options for web search.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of results requested per query
pub const DEFAULT_MAX_RESULTS: usize = 15;

/// Upper bound accepted by the search API
pub const MAX_RESULTS_LIMIT: usize = 20;

/// Search scope (the search API's `topic`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// General web search
    #[default]
    General,
    /// News-oriented search
    News,
    /// Finance-oriented search
    Finance,
}

impl SearchScope {
    /// Wire name of the scope
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::General => "general",
            SearchScope::News => "news",
            SearchScope::Finance => "finance",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(SearchScope::General),
            "news" => Ok(SearchScope::News),
            "finance" => Ok(SearchScope::Finance),
            other => Err(format!("Unknown search scope '{}'", other)),
        }
    }
}

/// Search depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            other => Err(format!("Unknown search depth '{}'", other)),
        }
    }
}

/// Per-round search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Scope sent with every request of the round
    pub scope: SearchScope,
    /// Result-count ceiling per request
    pub max_results: usize,
    /// Search depth
    pub depth: SearchDepth,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scope: SearchScope::default(),
            max_results: DEFAULT_MAX_RESULTS,
            depth: SearchDepth::default(),
        }
    }
}

impl SearchConfig {
    /// Create a new search configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search scope
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the result-count ceiling, clamped to `1..=MAX_RESULTS_LIMIT`
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        self
    }

    /// Set the search depth
    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }
}

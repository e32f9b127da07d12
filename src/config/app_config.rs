//! Application configuration module for briefcraft
//!
//! Provides TOML-based configuration with environment variable override support.
//! Priority: CLI args > Environment variables > Config file > Defaults

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::{self, ConfigSource};
use super::search_config::{SearchConfig, SearchDepth, MAX_RESULTS_LIMIT};
use crate::query::MAX_QUERIES;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the OpenAI-compatible chat completion API
    #[serde(default = "default_llm_base_url")]
    llm_base_url: String,

    /// API key for the chat completion API
    #[serde(default)]
    llm_api_key: Option<String>,

    /// Base URL of the Tavily search API
    #[serde(default = "default_tavily_base_url")]
    tavily_base_url: String,

    /// Tavily API key
    #[serde(default)]
    tavily_api_key: Option<String>,

    /// Model used for query generation
    #[serde(default = "default_query_model")]
    query_model: String,

    /// Model used to compile the final report
    #[serde(default = "default_editor_model")]
    editor_model: String,

    /// Maximum number of queries kept per analyst (1-4)
    #[serde(default = "default_max_queries")]
    max_queries: usize,

    /// Maximum results requested per search query
    #[serde(default = "default_max_results")]
    max_results: usize,

    /// Search depth: basic or advanced
    #[serde(default)]
    search_depth: SearchDepth,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_query_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_editor_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_queries() -> usize {
    4
}

fn default_max_results() -> usize {
    15
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_base_url: default_llm_base_url(),
            llm_api_key: None,
            tavily_base_url: default_tavily_base_url(),
            tavily_api_key: None,
            query_model: default_query_model(),
            editor_model: default_editor_model(),
            max_queries: default_max_queries(),
            max_results: default_max_results(),
            search_depth: SearchDepth::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Create config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Load the located config file (if any), overlay the environment and validate
    ///
    /// `flag` is the `--config` value; see [`paths::locate`] for the lookup order.
    pub fn load(flag: Option<&str>) -> Result<Self> {
        let source = paths::locate(flag)?;
        Self::load_from(&source)
    }

    /// Same as [`AppConfig::load`] for an already located source
    pub fn load_from(source: &ConfigSource) -> Result<Self> {
        let path = source.path();
        let file_config = if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::from_file(path)?
        } else if source.is_required() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        } else {
            Self::default()
        };

        let config = file_config.merge_with(&Self::from_env());
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("BRIEFCRAFT_LLM_BASE_URL") {
            config.llm_base_url = url;
        }

        if let Ok(api_key) = std::env::var("BRIEFCRAFT_LLM_API_KEY") {
            config.llm_api_key = Some(api_key);
        } else if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.llm_api_key = Some(api_key);
        }

        if let Ok(url) = std::env::var("BRIEFCRAFT_TAVILY_BASE_URL") {
            config.tavily_base_url = url;
        }

        if let Ok(api_key) = std::env::var("BRIEFCRAFT_TAVILY_API_KEY") {
            config.tavily_api_key = Some(api_key);
        } else if let Ok(api_key) = std::env::var("TAVILY_API_KEY") {
            config.tavily_api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("BRIEFCRAFT_QUERY_MODEL") {
            config.query_model = model;
        }

        if let Ok(model) = std::env::var("BRIEFCRAFT_EDITOR_MODEL") {
            config.editor_model = model;
        }

        if let Ok(max_results) = std::env::var("BRIEFCRAFT_MAX_RESULTS") {
            if let Ok(n) = max_results.parse() {
                config.max_results = n;
            }
        }

        if let Ok(depth) = std::env::var("BRIEFCRAFT_SEARCH_DEPTH") {
            match depth.parse() {
                Ok(depth) => config.search_depth = depth,
                Err(e) => tracing::warn!("Ignoring BRIEFCRAFT_SEARCH_DEPTH: {}", e),
            }
        }

        config
    }

    /// Merge with another config (other takes priority for non-default values)
    pub fn merge_with(&self, other: &Self) -> Self {
        fn pick<T: PartialEq + Clone>(mine: &T, theirs: &T, default: T) -> T {
            if *theirs != default {
                theirs.clone()
            } else {
                mine.clone()
            }
        }

        Self {
            llm_base_url: pick(&self.llm_base_url, &other.llm_base_url, default_llm_base_url()),
            llm_api_key: other.llm_api_key.clone().or_else(|| self.llm_api_key.clone()),
            tavily_base_url: pick(
                &self.tavily_base_url,
                &other.tavily_base_url,
                default_tavily_base_url(),
            ),
            tavily_api_key: other
                .tavily_api_key
                .clone()
                .or_else(|| self.tavily_api_key.clone()),
            query_model: pick(&self.query_model, &other.query_model, default_query_model()),
            editor_model: pick(&self.editor_model, &other.editor_model, default_editor_model()),
            max_queries: pick(&self.max_queries, &other.max_queries, default_max_queries()),
            max_results: pick(&self.max_results, &other.max_results, default_max_results()),
            search_depth: pick(&self.search_depth, &other.search_depth, SearchDepth::default()),
            timeout_secs: pick(&self.timeout_secs, &other.timeout_secs, default_timeout_secs()),
        }
    }

    /// Override the chat completion base URL
    pub fn with_llm_base_url(mut self, url: &str) -> Self {
        self.llm_base_url = url.to_string();
        self
    }

    /// Override the Tavily base URL
    pub fn with_tavily_base_url(mut self, url: &str) -> Self {
        self.tavily_base_url = url.to_string();
        self
    }

    /// Override the API keys
    pub fn with_api_keys(mut self, llm_api_key: &str, tavily_api_key: &str) -> Self {
        self.llm_api_key = Some(llm_api_key.to_string());
        self.tavily_api_key = Some(tavily_api_key.to_string());
        self
    }

    /// Override max_results
    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    /// Override max_queries
    pub fn with_max_queries(mut self, n: usize) -> Self {
        self.max_queries = n;
        self
    }

    /// Override the search depth
    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_queries == 0 || self.max_queries > MAX_QUERIES {
            return Err(anyhow!("max_queries must be between 1 and {}", MAX_QUERIES));
        }

        if self.max_results == 0 || self.max_results > MAX_RESULTS_LIMIT {
            return Err(anyhow!(
                "max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            ));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Require both API keys, as needed by the research commands
    pub fn require_api_keys(&self) -> Result<(String, String)> {
        let llm = self
            .llm_api_key
            .clone()
            .ok_or_else(|| anyhow!("Missing API keys: set OPENAI_API_KEY or llm_api_key"))?;
        let tavily = self
            .tavily_api_key
            .clone()
            .ok_or_else(|| anyhow!("Missing API keys: set TAVILY_API_KEY or tavily_api_key"))?;
        Ok((llm, tavily))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }

    /// Search configuration derived from this config (general scope)
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new()
            .with_max_results(self.max_results)
            .with_depth(self.search_depth)
    }

    // Getters
    pub fn llm_base_url(&self) -> &str {
        &self.llm_base_url
    }

    pub fn llm_api_key(&self) -> Option<String> {
        self.llm_api_key.clone()
    }

    pub fn tavily_base_url(&self) -> &str {
        &self.tavily_base_url
    }

    pub fn tavily_api_key(&self) -> Option<String> {
        self.tavily_api_key.clone()
    }

    pub fn query_model(&self) -> &str {
        &self.query_model
    }

    pub fn editor_model(&self) -> &str {
        &self.editor_model
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn search_depth(&self) -> SearchDepth {
        self.search_depth
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm_base_url(), "https://api.openai.com/v1");
        assert_eq!(config.tavily_base_url(), "https://api.tavily.com");
        assert_eq!(config.max_queries(), 4);
        assert_eq!(config.max_results(), 15);
        assert_eq!(config.search_depth(), SearchDepth::Basic);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_max_results() {
        assert!(AppConfig::default().with_max_results(0).validate().is_err());
        assert!(AppConfig::default().with_max_results(21).validate().is_err());
    }

    #[test]
    fn test_validate_invalid_max_queries() {
        assert!(AppConfig::default().with_max_queries(0).validate().is_err());
        assert!(AppConfig::default().with_max_queries(8).validate().is_err());
        assert!(AppConfig::default().with_max_queries(MAX_QUERIES).validate().is_ok());
    }

    #[test]
    fn test_require_api_keys() {
        assert!(AppConfig::default().require_api_keys().is_err());

        let config = AppConfig::default().with_api_keys("sk-llm", "tvly-key");
        let (llm, tavily) = config.require_api_keys().unwrap();
        assert_eq!(llm, "sk-llm");
        assert_eq!(tavily, "tvly-key");
    }

    #[test]
    fn test_search_config_from_app_config() {
        let config = AppConfig::default().with_max_results(10);
        let search = config.search_config();
        assert_eq!(search.max_results, 10);
        assert_eq!(search.depth, SearchDepth::Basic);

        let advanced = config.with_search_depth(SearchDepth::Advanced).search_config();
        assert_eq!(advanced.depth, SearchDepth::Advanced);
    }
}

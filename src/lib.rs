//! briefcraft: Company research briefings from streamed LLM queries and web search
//!
//! This library turns a company name into a research report: an LLM
//! streams search queries for each analyst perspective, every query is
//! searched concurrently, and the merged results feed a compiled report.
//!
//! # Features
//!
//! - Incremental query extraction from a streamed chat completion
//! - Concurrent multi-query web search with per-request failure isolation
//! - URL-keyed result merging with title cleanup
//! - Fire-and-forget status notifications
//!
//! # Modules
//!
//! - `config`: Application and search configuration
//! - `llm`: OpenAI-compatible chat completion client and SSE decoding
//! - `query`: Query extraction and generation
//! - `search`: Tavily client, parallel searcher and result merging
//! - `status`: Status updates and sinks
//! - `nodes`: Grounding, researcher, collector and editor steps
//! - `workflow`: The full research pipeline

pub mod config;
pub mod llm;
pub mod nodes;
pub mod query;
pub mod search;
pub mod status;
pub mod workflow;

// Re-export commonly used types
pub use config::{SearchConfig, SearchScope};
pub use nodes::{Analyst, InputState, ResearchState};
pub use query::{QueryError, QueryExtractor};
pub use search::{DocumentMap, ParallelSearcher, SearchResult};
pub use workflow::ResearchWorkflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

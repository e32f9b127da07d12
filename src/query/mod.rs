//! Query module
//!
//! Streamed query extraction and LLM-backed query generation.

mod extractor;
mod generator;

pub use extractor::{Fragment, QueryExtractor, MAX_QUERIES};
pub use generator::{fallback_queries, format_query_prompt, QueryContext, QueryGenerator};

use thiserror::Error;

use crate::llm::LlmError;

/// Query generation failures; all are recoverable with fallback queries
#[derive(Debug, Error)]
pub enum QueryError {
    /// The completion produced no usable query
    #[error("No queries generated")]
    EmptyQueryGeneration,

    /// The completion stream failed part-way
    #[error("Completion stream failed: {0}")]
    Stream(String),

    /// The completion request could not be opened
    #[error(transparent)]
    Llm(#[from] LlmError),
}

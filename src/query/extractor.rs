//! Streamed query extraction
//!
//! Splits a streamed completion into one query per line. Fragments are
//! accumulated in a single buffer; every newline closes the queries before
//! it and the text after the last newline stays buffered until more
//! fragments arrive or the stream ends.

use futures::{Stream, StreamExt};
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;

use super::QueryError;
use crate::llm::StreamChunk;
use crate::status::{Status, StatusSink, StatusUpdate};

/// Hard cap on the number of queries kept from one completion
pub const MAX_QUERIES: usize = 4;

/// One piece of a streamed completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Incremental text
    Text(String),
    /// `finish_reason == "stop"`: no more text will be accepted
    Stop,
}

impl From<StreamChunk> for Fragment {
    fn from(chunk: StreamChunk) -> Self {
        if chunk.is_stop() {
            Fragment::Stop
        } else {
            Fragment::Text(chunk.content.unwrap_or_default())
        }
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

struct Progress {
    sink: Arc<dyn StatusSink>,
    category: String,
}

/// Buffer-and-split query extractor
pub struct QueryExtractor {
    buffer: String,
    queries: Vec<String>,
    max_queries: usize,
    progress: Option<Progress>,
}

impl Default for QueryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryExtractor {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            queries: Vec::new(),
            max_queries: MAX_QUERIES,
            progress: None,
        }
    }

    /// Override the query cap, clamped to `1..=MAX_QUERIES`
    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.clamp(1, MAX_QUERIES);
        self
    }

    /// Report `query_generating` / `query_generated` progress to `sink`
    pub fn with_progress(mut self, sink: Arc<dyn StatusSink>, category: impl Into<String>) -> Self {
        self.progress = Some(Progress {
            sink,
            category: category.into(),
        });
        self
    }

    /// Whether the cap has been reached
    pub fn is_full(&self) -> bool {
        self.queries.len() >= self.max_queries
    }

    /// Queries completed so far
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Text of the query currently being accumulated
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Append a fragment, closing every query terminated by a newline
    pub fn push(&mut self, text: &str) {
        if text.is_empty() || self.is_full() {
            return;
        }

        self.buffer.push_str(text);
        self.report(
            Status::QueryGenerating,
            "Generating research query",
            &self.buffer,
            self.queries.len() + 1,
            false,
        );

        if !self.buffer.contains('\n') {
            return;
        }

        let buffered = std::mem::take(&mut self.buffer);
        let mut segments: Vec<&str> = buffered.split('\n').collect();
        // split always yields at least one segment
        let rest = segments.pop().unwrap_or_default();

        for segment in segments {
            self.accept(segment, "Generated new research query");
        }
        self.buffer = rest.to_string();
    }

    /// Flush the remainder and return the ordered queries
    pub fn finish(mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        self.accept(&rest, "Generated final research query");
        self.queries.truncate(self.max_queries);
        self.queries
    }

    /// Extract from an in-memory sequence of fragments
    pub fn extract_from<I, T>(mut self, fragments: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for fragment in fragments {
            if self.is_full() {
                break;
            }
            self.push(fragment.as_ref());
        }
        self.finish()
    }

    /// Extract from a fragment stream
    ///
    /// Reading stops at `Fragment::Stop`, at the end of the stream, or once
    /// the cap is reached. An empty result is `QueryError::EmptyQueryGeneration`;
    /// a stream error is `QueryError::Stream`.
    pub async fn extract<S, F, E>(mut self, stream: S) -> Result<Vec<String>, QueryError>
    where
        S: Stream<Item = Result<F, E>>,
        F: Into<Fragment>,
        E: Display,
    {
        futures::pin_mut!(stream);

        while let Some(item) = stream.next().await {
            match item.map(Into::into) {
                Ok(Fragment::Stop) => break,
                Ok(Fragment::Text(text)) => self.push(&text),
                Err(e) => return Err(QueryError::Stream(e.to_string())),
            }
            if self.is_full() {
                tracing::debug!(max = self.max_queries, "query cap reached, dropping stream");
                break;
            }
        }

        let queries = self.finish();
        if queries.is_empty() {
            return Err(QueryError::EmptyQueryGeneration);
        }
        Ok(queries)
    }

    fn accept(&mut self, candidate: &str, message: &str) {
        let query = candidate.trim();
        if query.is_empty() || self.is_full() {
            return;
        }
        self.queries.push(query.to_string());
        self.report(Status::QueryGenerated, message, query, self.queries.len(), true);
    }

    fn report(&self, status: Status, message: &str, query: &str, number: usize, complete: bool) {
        let Some(progress) = &self.progress else {
            return;
        };
        let update = StatusUpdate::new(status, message).with_result(json!({
            "query": query,
            "query_number": number,
            "category": progress.category,
            "is_complete": complete,
        }));
        progress.sink.notify(update.into());
    }
}

//! Research query generation
//!
//! Streams a completion from the chat API and extracts one query per line.

use chrono::{DateTime, Datelike, Local};
use std::sync::Arc;

use super::extractor::{QueryExtractor, MAX_QUERIES};
use super::QueryError;
use crate::llm::{ChatClient, ChatCompletionOptions, ChatMessage};
use crate::status::{NoopSink, Status, StatusSink, StatusUpdate};

/// Company details used to fill the prompt
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub company: String,
    pub industry: String,
    pub hq: String,
}

impl QueryContext {
    pub fn new(company: Option<&str>, industry: Option<&str>, hq: Option<&str>) -> Self {
        Self {
            company: company.unwrap_or("Unknown Company").to_string(),
            industry: industry.unwrap_or("Unknown Industry").to_string(),
            hq: hq.unwrap_or("Unknown HQ").to_string(),
        }
    }
}

/// Append the fixed query guidelines to an analyst prompt
pub fn format_query_prompt(prompt: &str, company: &str, hq: &str, year: i32) -> String {
    format!(
        "{prompt}\n\n\
         Important Guidelines:\n\
         - Focus ONLY on {company}-specific information (headquartered in {hq}, as of {year})\n\
         - Make queries very brief and to the point\n\
         - Provide exactly 4 search queries (one per line), with no hyphens or dashes\n\
         - DO NOT make assumptions about the industry - use only the provided industry information"
    )
}

/// Deterministic queries used when generation yields nothing
pub fn fallback_queries(company: &str, year: i32) -> Vec<String> {
    vec![
        format!("{company} overview {year}"),
        format!("{company} recent news {year}"),
        format!("{company} financial reports {year}"),
        format!("{company} industry analysis {year}"),
    ]
}

/// Generates search queries with a streamed completion
pub struct QueryGenerator {
    client: Arc<ChatClient>,
    model: String,
    max_queries: usize,
    sink: Arc<dyn StatusSink>,
}

impl QueryGenerator {
    pub fn new(client: Arc<ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_queries: MAX_QUERIES,
            sink: Arc::new(NoopSink),
        }
    }

    /// Clamped to `1..=MAX_QUERIES`, so the fallback list is never emptied
    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.clamp(1, MAX_QUERIES);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    /// Build the system and user messages for one analyst prompt
    pub fn build_messages(
        &self,
        ctx: &QueryContext,
        prompt: &str,
        now: DateTime<Local>,
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "You are researching {}, a company in the {} industry.",
                ctx.company, ctx.industry
            )),
            ChatMessage::user(format!(
                "Researching {} on {}.\n{}",
                ctx.company,
                now.format("%B %d, %Y"),
                format_query_prompt(prompt, &ctx.company, &ctx.hq, now.year())
            )),
        ]
    }

    /// Generate queries; an empty or failed generation is an error
    pub async fn generate(
        &self,
        ctx: &QueryContext,
        prompt: &str,
        category: &str,
    ) -> Result<Vec<String>, QueryError> {
        tracing::info!("Generating queries for {} as {}", ctx.company, category);

        let messages = self.build_messages(ctx, prompt, Local::now());
        let options = ChatCompletionOptions {
            max_tokens: Some(4096),
            temperature: Some(0.0),
        };
        let stream = self
            .client
            .stream_chat_completion(&self.model, messages, options)
            .await?;

        let queries = QueryExtractor::new()
            .with_max_queries(self.max_queries)
            .with_progress(self.sink.clone(), category)
            .extract(stream)
            .await?;

        tracing::info!("Final queries for {}: {:?}", category, queries);
        Ok(queries)
    }

    /// Generate queries, substituting [`fallback_queries`] on any failure
    pub async fn generate_or_fallback(
        &self,
        ctx: &QueryContext,
        prompt: &str,
        category: &str,
    ) -> Vec<String> {
        match self.generate(ctx, prompt, category).await {
            Ok(queries) => queries,
            Err(e) => {
                tracing::error!("Error generating queries for {}: {}", ctx.company, e);
                self.sink.notify(
                    StatusUpdate::new(
                        Status::Error,
                        format!("Failed to generate research queries: {}", e),
                    )
                    .with_error(format!("Query generation failed: {}", e))
                    .into(),
                );
                let mut queries = fallback_queries(&ctx.company, Local::now().year());
                queries.truncate(self.max_queries);
                queries
            }
        }
    }
}

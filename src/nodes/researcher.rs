//! Per-analyst research: generate queries, then run one search round

use std::sync::Arc;

use super::state::{Analyst, ResearchState};
use crate::config::SearchConfig;
use crate::query::{QueryContext, QueryGenerator};
use crate::search::{ParallelSearcher, SearchCondition, SearchOutcome, SearchTransport};
use crate::status::{AnalystUpdate, NoopSink, StatusSink};

/// What one analyst produced
#[derive(Debug, Clone)]
pub struct ResearchOutput {
    pub analyst: Analyst,
    pub queries: Vec<String>,
    pub outcome: SearchOutcome,
    /// Summary line for the state's message log
    pub message: String,
}

impl ResearchOutput {
    /// Store the documents in the analyst's slot and log the summary
    pub fn apply(self, state: &mut ResearchState) {
        *state.data_mut(self.analyst) = self.outcome.documents;
        state.messages.push(self.message);
    }
}

/// Researcher for a single [`Analyst`]
pub struct Researcher {
    analyst: Analyst,
    generator: Arc<QueryGenerator>,
    searcher: ParallelSearcher,
    sink: Arc<dyn StatusSink>,
}

impl Researcher {
    /// The searcher is scoped to the analyst; the rest of `config` is kept
    pub fn new(
        analyst: Analyst,
        generator: Arc<QueryGenerator>,
        transport: Arc<dyn SearchTransport>,
        config: SearchConfig,
    ) -> Self {
        Self {
            analyst,
            generator,
            searcher: ParallelSearcher::new(transport, config.with_scope(analyst.scope())),
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.searcher = self.searcher.with_sink(sink.clone());
        self.sink = sink;
        self
    }

    pub fn analyst(&self) -> Analyst {
        self.analyst
    }

    pub fn searcher(&self) -> &ParallelSearcher {
        &self.searcher
    }

    pub async fn research(&self, state: &ResearchState) -> ResearchOutput {
        let ctx = QueryContext::new(
            Some(state.company.as_str()),
            state.industry.as_deref(),
            state.hq_location.as_deref(),
        );
        let prompt = self.analyst.prompt(&ctx.company);

        let queries = self
            .generator
            .generate_or_fallback(&ctx, &prompt, self.analyst.analyst_type())
            .await;

        self.sink.notify(
            AnalystUpdate {
                analyst: self.analyst.analyst_type().to_string(),
                queries: queries.clone(),
            }
            .into(),
        );

        let outcome = self.searcher.search(&queries).await;
        let message = summarize(self.analyst, &queries, &outcome);
        tracing::info!("{}", message);

        ResearchOutput {
            analyst: self.analyst,
            queries,
            outcome,
            message,
        }
    }
}

fn summarize(analyst: Analyst, queries: &[String], outcome: &SearchOutcome) -> String {
    let mut lines = vec![format!(
        "{} analyst: {} queries, {} documents found",
        analyst.label(),
        queries.len(),
        outcome.documents.len()
    )];
    for query in queries {
        lines.push(format!("  - {}", query));
    }
    if outcome.failed > 0 {
        lines.push(format!(
            "  {} of {} searches failed",
            outcome.failed, outcome.dispatched
        ));
    }
    match outcome.condition {
        Some(SearchCondition::NoValidQueries) => lines.push("  No valid queries to search".to_string()),
        Some(SearchCondition::NoResultsFound) => lines.push("  No results found".to_string()),
        None => {}
    }
    lines.join("\n")
}

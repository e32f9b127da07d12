//! Collection: check what each analyst gathered before editing

use serde_json::json;
use std::sync::Arc;

use super::state::{Analyst, ResearchState};
use crate::status::{NoopSink, Status, StatusSink, StatusUpdate};

pub struct Collector {
    sink: Arc<dyn StatusSink>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Append a per-slot summary to the state's messages
    pub fn run(&self, state: &mut ResearchState) {
        let message = collection_message(state);
        let counts: serde_json::Map<String, serde_json::Value> = Analyst::ALL
            .iter()
            .map(|a| (a.category().to_string(), json!(state.data(*a).len())))
            .collect();

        self.sink.notify(
            StatusUpdate::new(
                Status::CollectionComplete,
                format!("Collected research data for {}", state.company),
            )
            .with_result(json!({"documents": counts}))
            .into(),
        );
        state.messages.push(message);
    }
}

/// One line per analyst slot, plus a warning when a slot is empty
pub fn collection_message(state: &ResearchState) -> String {
    let mut lines = vec![format!("Collecting research data for {}:", state.company)];
    let mut all_present = true;

    // Same order as the compiled report sections
    for analyst in Analyst::ALL {
        let data = state.data(analyst);
        if data.is_empty() {
            lines.push(format!("- {}: No data found", analyst.label()));
            all_present = false;
            continue;
        }
        let with_raw = data.values().filter(|doc| doc.raw_content.is_some()).count();
        lines.push(format!("- {}: {} documents collected", analyst.label(), data.len()));
        lines.push(format!("  {}/{} documents have raw content", with_raw, data.len()));
    }

    if !all_present {
        tracing::warn!("Some research data is missing for {}", state.company);
        lines.push("\nWarning: Some research data is missing".to_string());
    }

    lines.join("\n")
}

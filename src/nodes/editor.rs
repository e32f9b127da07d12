//! Editing: compile the analysts' briefings into one report

use chrono::{Local, NaiveDate};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::state::{Analyst, ResearchState};
use crate::llm::{ChatClient, ChatCompletionOptions, ChatMessage, LlmError};
use crate::status::{NoopSink, Status, StatusSink, StatusUpdate};

const RULE_WIDTH: usize = 80;

pub struct Editor {
    client: Arc<ChatClient>,
    model: String,
    sink: Arc<dyn StatusSink>,
}

/// Briefings as report sections, in analyst order, skipping missing ones
pub fn format_sections(briefings: &BTreeMap<String, String>) -> Vec<String> {
    Analyst::ALL
        .iter()
        .filter_map(|analyst| {
            briefings
                .get(analyst.category())
                .filter(|content| !content.trim().is_empty())
                .map(|content| {
                    format!("{}\n{}\n{}\n", analyst.section_title(), "=".repeat(40), content)
                })
        })
        .collect()
}

/// Prompt asking for one cohesive report
pub fn build_prompt(company: &str, sections: &[String], date: NaiveDate) -> String {
    format!(
        "You are compiling a comprehensive research report about {company}.\n\
         I will provide you with four sections of research that have already been prepared.\n\
         Your task is to:\n\
         1. Review all sections and identify any redundant information\n\
         2. Ensure smooth transitions between sections\n\
         3. Maintain consistent formatting and style\n\
         4. Preserve the distinct focus of each section while removing repetition\n\
         5. Keep all factual information but improve clarity and flow\n\
         6. Ensure information is up to date and recent ({date})\n\
         \n\
         Here are the sections:\n\
         \n\
         {sections}\n\
         \n\
         Please compile these into a single cohesive report that:\n\
         - Maintains the four distinct sections with their original headers\n\
         - Removes any redundant information between sections\n\
         - Ensures consistent style and formatting throughout\n\
         - Improves clarity and readability\n\
         - Uses bullet points for key information\n\
         - Preserves all important facts and insights\n\
         - Includes a list of URL citations at the end\n\
         \n\
         Return the edited report with the same section structure but improved flow and clarity.",
        date = date.format("%Y-%m-%d"),
        sections = sections.join("\n"),
    )
}

impl Editor {
    pub fn new(client: Arc<ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// One completion over all sections
    pub async fn edit_report(
        &self,
        company: &str,
        briefings: &BTreeMap<String, String>,
    ) -> Result<String, LlmError> {
        let sections = format_sections(briefings);
        let prompt = build_prompt(company, &sections, Local::now().date_naive());
        let options = ChatCompletionOptions {
            max_tokens: Some(1024),
            temperature: Some(0.0),
        };

        let response = self
            .client
            .chat_completion(&self.model, vec![ChatMessage::user(prompt)], options)
            .await?;
        Ok(response.content)
    }

    /// Fill `state.report`; failures are logged and noted, never propagated
    pub async fn run(&self, state: &mut ResearchState) {
        let mut lines = vec![format!("Compiling final report for {}...", state.company)];

        if state.briefings.is_empty() {
            lines.push("\nNo briefings available to compile".to_string());
            state.report = None;
        } else {
            lines.push(format!("\nFound {} briefings to compile", state.briefings.len()));
            match self.edit_report(&state.company, &state.briefings).await {
                Ok(report) => {
                    lines.push("\nReport compilation complete".to_string());
                    lines.push("\nFinal Report:".to_string());
                    lines.push("=".repeat(RULE_WIDTH));
                    lines.push(report.clone());
                    lines.push("=".repeat(RULE_WIDTH));
                    self.sink.notify(
                        StatusUpdate::new(Status::EditorComplete, "Report compilation complete")
                            .with_result(json!({"report_length": report.len()}))
                            .into(),
                    );
                    state.report = Some(report);
                }
                Err(e) => {
                    tracing::error!("Error compiling report for {}: {}", state.company, e);
                    lines.push(format!("\nReport compilation failed: {}", e));
                    self.sink.notify(
                        StatusUpdate::new(Status::Error, "Failed to compile report")
                            .with_error(e.to_string())
                            .into(),
                    );
                    state.report = None;
                }
            }
        }

        state.messages.push(lines.join("\n"));
    }
}

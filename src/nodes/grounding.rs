//! Grounding: initial company context before the analysts run

use serde_json::json;
use std::sync::Arc;

use super::state::{InputState, ResearchState, SiteScrape};
use crate::config::SearchDepth;
use crate::search::TavilyClient;
use crate::status::{NoopSink, Status, StatusSink, StatusUpdate};

/// Scrapes the company website (when a URL is known) and seeds the state
pub struct GroundingNode {
    tavily: Arc<TavilyClient>,
    depth: SearchDepth,
    sink: Arc<dyn StatusSink>,
}

impl GroundingNode {
    pub fn new(tavily: Arc<TavilyClient>) -> Self {
        Self {
            tavily,
            depth: SearchDepth::Basic,
            sink: Arc::new(NoopSink),
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Build the initial [`ResearchState`]; never fails
    pub async fn run(&self, input: InputState) -> ResearchState {
        let company = input.company.clone();
        let mut msg = format!("Initiating research for {}...\n", company);

        self.send(
            Status::ResearchStart,
            format!("Starting research for {}", company),
            Some(json!({"company": company})),
        );
        self.send(
            Status::SearchStart,
            format!("Searching for information about {}", company),
            Some(json!({"step": "Search", "company": company})),
        );

        let mut site_scrape = None;
        match input.company_url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                msg.push_str(&format!("\nAnalyzing company website: {}", url));
                site_scrape = self.scrape(&company, url, &mut msg).await;
            }
            _ => {
                msg.push_str("\nNo company URL provided, proceeding directly to research phase");
                self.send(Status::SiteScrapeSkip, "No company URL provided", None);
            }
        }

        let mut context = serde_json::Map::new();
        if let Some(hq) = &input.hq_location {
            msg.push_str(&format!("\nCompany HQ: {}", hq));
            context.insert("hq_location".to_string(), json!(hq));
        }
        if let Some(industry) = &input.industry {
            msg.push_str(&format!("\nIndustry: {}", industry));
            context.insert("industry".to_string(), json!(industry));
        }
        if !context.is_empty() {
            self.send(
                Status::ContextComplete,
                "Additional context gathered",
                Some(context.into()),
            );
        }

        let mut state = ResearchState::from_input(input);
        state.site_scrape = site_scrape;
        state.messages.push(msg);

        self.send(
            Status::SearchComplete,
            format!("Completed initial search for {}", company),
            Some(json!({"step": "Search", "company": company})),
        );
        self.send(
            Status::GroundingComplete,
            "Grounding phase complete",
            Some(json!({"state_keys": state.state_keys()})),
        );
        tracing::info!("Grounding complete for {}", company);

        state
    }

    async fn scrape(&self, company: &str, url: &str, msg: &mut String) -> Option<SiteScrape> {
        self.send(
            Status::SiteScrapeStart,
            format!("Analyzing company website: {}", url),
            Some(json!({"url": url})),
        );

        match self.tavily.extract(&[url.to_string()], self.depth).await {
            Ok(pages) => {
                let contents: Vec<String> = pages
                    .into_iter()
                    .filter_map(|page| page.raw_content)
                    .filter(|content| !content.is_empty())
                    .collect();

                if contents.is_empty() {
                    msg.push_str("\nNo content found in website extraction");
                    self.send(
                        Status::SiteScrapeError,
                        "No content found in website extraction",
                        Some(json!({"error": "No content found in extraction results"})),
                    );
                    return None;
                }

                let raw_content = contents.join("\n\n");
                msg.push_str("\nSuccessfully extracted content from website");
                self.send(
                    Status::SiteScrapeComplete,
                    "Successfully extracted website content",
                    Some(json!({"url": url, "content_length": raw_content.len()})),
                );
                Some(SiteScrape {
                    title: company.to_string(),
                    raw_content,
                })
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "website extraction failed");
                let error_msg = format!("Error extracting website content: {}", e);
                msg.push_str(&format!("\n{}", error_msg));
                self.send(
                    Status::SiteScrapeError,
                    error_msg,
                    Some(json!({"error": e.to_string()})),
                );
                None
            }
        }
    }

    fn send(&self, status: Status, message: impl Into<String>, result: Option<serde_json::Value>) {
        let mut update = StatusUpdate::new(status, message);
        update.result = result;
        tracing::debug!("Grounding update - {:?}: {}", update.status, update.message);
        self.sink.notify(update.into());
    }
}

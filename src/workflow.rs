//! End-to-end research workflow
//!
//! grounding → all analysts concurrently → collector → editor

use anyhow::Result;
use std::sync::Arc;

use crate::config::app_config::AppConfig;
use crate::llm::ChatClient;
use crate::nodes::{Analyst, Collector, Editor, GroundingNode, InputState, ResearchState, Researcher};
use crate::query::QueryGenerator;
use crate::search::{SearchTransport, TavilyClient};
use crate::status::StatusSink;

pub struct ResearchWorkflow {
    grounding: GroundingNode,
    researchers: Vec<Researcher>,
    collector: Collector,
    editor: Editor,
}

impl ResearchWorkflow {
    /// Build clients from configuration; fails on invalid config or missing keys
    pub fn from_config(config: &AppConfig, sink: Arc<dyn StatusSink>) -> Result<Self> {
        config.validate()?;
        let (llm_key, tavily_key) = config.require_api_keys()?;

        let chat = Arc::new(ChatClient::with_config(
            llm_key,
            Some(config.llm_base_url().to_string()),
            Some(config.timeout()),
        ));
        let tavily = Arc::new(TavilyClient::with_config(
            tavily_key,
            Some(config.tavily_base_url().to_string()),
            Some(config.timeout()),
        ));

        Ok(Self::new(chat, tavily, config, sink))
    }

    pub fn new(
        chat: Arc<ChatClient>,
        tavily: Arc<TavilyClient>,
        config: &AppConfig,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let search_config = config.search_config();
        let generator = Arc::new(
            QueryGenerator::new(chat.clone(), config.query_model())
                .with_max_queries(config.max_queries())
                .with_sink(sink.clone()),
        );
        let transport: Arc<dyn SearchTransport> = tavily.clone();

        let researchers = Analyst::ALL
            .iter()
            .map(|analyst| {
                Researcher::new(
                    *analyst,
                    generator.clone(),
                    transport.clone(),
                    search_config.clone(),
                )
                .with_sink(sink.clone())
            })
            .collect();

        Self {
            grounding: GroundingNode::new(tavily)
                .with_depth(search_config.depth)
                .with_sink(sink.clone()),
            researchers,
            collector: Collector::new().with_sink(sink.clone()),
            editor: Editor::new(chat, config.editor_model()).with_sink(sink),
        }
    }

    pub async fn run(&self, input: InputState) -> ResearchState {
        tracing::info!("Starting research workflow for {}", input.company);

        let mut state = self.grounding.run(input).await;

        let outputs = futures::future::join_all(
            self.researchers.iter().map(|researcher| researcher.research(&state)),
        )
        .await;
        for output in outputs {
            output.apply(&mut state);
        }

        self.collector.run(&mut state);
        self.editor.run(&mut state).await;

        tracing::info!("Research workflow complete for {}", state.company);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::NoopSink;

    #[test]
    fn test_from_config_requires_keys() {
        let result = ResearchWorkflow::from_config(&AppConfig::default(), Arc::new(NoopSink));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = AppConfig::default()
            .with_api_keys("sk-test", "tvly-test")
            .with_max_queries(0);
        assert!(ResearchWorkflow::from_config(&config, Arc::new(NoopSink)).is_err());
    }

    #[test]
    fn test_from_config_rejects_raised_query_cap() {
        let config = AppConfig::default()
            .with_api_keys("sk-test", "tvly-test")
            .with_max_queries(8);
        assert!(ResearchWorkflow::from_config(&config, Arc::new(NoopSink)).is_err());
    }

    #[test]
    fn test_from_config_builds_all_analysts() {
        let config = AppConfig::default().with_api_keys("sk-test", "tvly-test");
        let workflow = ResearchWorkflow::from_config(&config, Arc::new(NoopSink)).unwrap();
        let analysts: Vec<Analyst> = workflow.researchers.iter().map(|r| r.analyst()).collect();
        assert_eq!(analysts, Analyst::ALL.to_vec());
    }
}

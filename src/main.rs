//! briefcraft: Command-line interface for company research briefings

use anyhow::{anyhow, Result};
use briefcraft::config::{app_config::AppConfig, paths, SearchScope};
use briefcraft::llm::ChatClient;
use briefcraft::nodes::{Analyst, InputState};
use briefcraft::query::{QueryContext, QueryGenerator};
use briefcraft::search::{ParallelSearcher, TavilyClient};
use briefcraft::status::{StatusSink, TracingSink};
use briefcraft::ResearchWorkflow;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// CLI Implementation
// ============================================================================

/// briefcraft: company research briefings from LLM-generated web searches
#[derive(Parser)]
#[command(name = "briefcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file (overrides BRIEFCRAFT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize briefcraft configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Generate research queries for one analyst
    Queries {
        /// Company name
        company: String,

        /// Analyst: company, industry, financial or news
        #[arg(short, long, default_value = "company")]
        analyst: Analyst,

        /// Company industry
        #[arg(long)]
        industry: Option<String>,

        /// Company headquarters location
        #[arg(long)]
        hq: Option<String>,
    },
    /// Run one parallel search round
    Search {
        /// Search queries (queries with fewer than 3 words are skipped)
        #[arg(required = true)]
        queries: Vec<String>,

        /// Search scope: general, news or finance
        #[arg(short, long, default_value = "general")]
        scope: SearchScope,

        /// Maximum results per query (1-20)
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
    },
    /// Research a company and compile a report
    Research {
        /// Company name
        company: String,

        /// Company website
        #[arg(long)]
        url: Option<String>,

        /// Company headquarters location
        #[arg(long)]
        hq: Option<String>,

        /// Company industry
        #[arg(long)]
        industry: Option<String>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; results go to stdout
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Init { force } => {
            let config_path = paths::default_config_path();
            let config_dir = paths::config_dir();

            eprintln!("Initializing briefcraft configuration...");
            eprintln!("Config directory: {}", config_dir.display());

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
                eprintln!("Created config directory");
            }

            if config_path.exists() && !force {
                eprintln!("Configuration file already exists: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                return Ok(());
            }

            let toml_content = AppConfig::default().to_toml()?;
            std::fs::write(&config_path, &toml_content)?;

            eprintln!("Created configuration file: {}", config_path.display());
            eprintln!("\nConfiguration initialized successfully!");
            eprintln!("Edit {} to customize settings.", config_path.display());

            Ok(())
        }
        Commands::Queries {
            company,
            analyst,
            industry,
            hq,
        } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let api_key = config
                .llm_api_key()
                .ok_or_else(|| anyhow!("Missing API key: set OPENAI_API_KEY or llm_api_key"))?;

            let client = Arc::new(ChatClient::with_config(
                api_key,
                Some(config.llm_base_url().to_string()),
                Some(config.timeout()),
            ));
            let generator = QueryGenerator::new(client, config.query_model())
                .with_max_queries(config.max_queries())
                .with_sink(Arc::new(TracingSink));

            let ctx = QueryContext::new(Some(company.as_str()), industry.as_deref(), hq.as_deref());
            let queries = generator
                .generate_or_fallback(&ctx, &analyst.prompt(&company), analyst.analyst_type())
                .await;

            println!("{} queries for {}:\n", analyst.label(), company);
            for (i, query) in queries.iter().enumerate() {
                println!("{}. {}", i + 1, query);
            }
            Ok(())
        }
        Commands::Search {
            queries,
            scope,
            max_results,
        } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let api_key = config
                .tavily_api_key()
                .ok_or_else(|| anyhow!("Missing API key: set TAVILY_API_KEY or tavily_api_key"))?;

            let tavily = Arc::new(TavilyClient::with_config(
                api_key,
                Some(config.tavily_base_url().to_string()),
                Some(config.timeout()),
            ));
            let search_config = config
                .search_config()
                .with_scope(scope)
                .with_max_results(max_results.unwrap_or(config.max_results()));
            let searcher =
                ParallelSearcher::new(tavily, search_config).with_sink(Arc::new(TracingSink));

            let outcome = searcher.search(&queries).await;

            if outcome.is_empty() {
                println!(
                    "No results found ({} queries searched, {} failed)",
                    outcome.dispatched, outcome.failed
                );
                return Ok(());
            }

            let mut documents: Vec<_> = outcome.documents.values().collect();
            documents.sort_by(|a, b| b.score.total_cmp(&a.score));

            println!(
                "Found {} documents from {} queries:\n",
                documents.len(),
                outcome.dispatched
            );
            for (i, doc) in documents.iter().enumerate() {
                let title = if doc.title.is_empty() { &doc.url } else { &doc.title };
                println!("{}. [score: {:.4}] {}", i + 1, doc.score, title);
                println!("   URL: {}", doc.url);
                println!("   Query: {}", doc.query);
                let snippet: String = doc.content.chars().take(150).collect();
                println!("   {}", snippet);
                println!();
            }
            Ok(())
        }
        Commands::Research {
            company,
            url,
            hq,
            industry,
            json,
        } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let sink: Arc<dyn StatusSink> = Arc::new(TracingSink);
            let workflow = ResearchWorkflow::from_config(&config, sink)?;

            let job_id = uuid::Uuid::new_v4().to_string();
            tracing::info!("Research job {} for {}", job_id, company);

            let input = InputState::new(company)
                .with_url(url)
                .with_hq(hq)
                .with_industry(industry)
                .with_job_id(job_id);
            let state = workflow.run(input).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                for message in &state.messages {
                    println!("{}\n", message);
                }
            }
            Ok(())
        }
    }
}

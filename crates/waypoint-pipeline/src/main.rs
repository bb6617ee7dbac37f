//! CLI entry point for the Waypoint hybrid retrieval pipeline.
//!
//! Answers one `--query`, or reads one query per line from stdin until EOF or
//! `exit`/`quit`. Each result is written to stdout as JSON; logs go to stderr.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use waypoint_core::{Embedder, ModelInvoker};
use waypoint_graph::GraphClient;
use waypoint_pipeline::{Orchestrator, Settings};
use waypoint_providers::{OpenAiClient, PineconeIndex, PineconeSearch};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Answer questions from a vector index and a knowledge graph")]
struct Cli {
    /// Answer a single query and exit.
    #[arg(short, long)]
    query: Option<String>,

    /// Number of semantic matches to retrieve (default: pipeline.top_k).
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Bypass the result cache.
    #[arg(long)]
    no_cache: bool,

    /// Print the retrieved matches and graph facts without generating an answer.
    #[arg(long)]
    retrieve_only: bool,

    /// Config file prefix (default: waypoint).
    #[arg(short, long, default_value = "waypoint")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    if cli.no_cache {
        settings.pipeline.cache.enabled = false;
    }

    let graph = GraphClient::connect(&settings.neo4j).await?;
    let openai = Arc::new(OpenAiClient::new(&settings.openai)?);
    let index = PineconeIndex::new(&settings.pinecone)?;

    let embedder: Arc<dyn Embedder> = openai.clone();
    let model: Arc<dyn ModelInvoker> = openai;
    let orchestrator = Orchestrator::new(
        Arc::new(PineconeSearch::new(embedder, index)),
        Arc::new(graph),
        model,
        &settings.pipeline,
    );

    let top_k = cli.top_k.unwrap_or(orchestrator.default_top_k());
    let outcome = match cli.query.as_deref() {
        Some(query) => answer(&orchestrator, query, top_k, cli.retrieve_only).await,
        None => interactive(&orchestrator, top_k, cli.retrieve_only).await,
    };

    orchestrator.shutdown().await;
    outcome
}

async fn answer(
    orchestrator: &Orchestrator,
    query: &str,
    top_k: usize,
    retrieve_only: bool,
) -> anyhow::Result<()> {
    let json = if retrieve_only {
        serde_json::to_string_pretty(&orchestrator.retrieve(query, top_k).await?)?
    } else {
        serde_json::to_string_pretty(&orchestrator.handle(query, top_k).await?)?
    };
    println!("{json}");
    Ok(())
}

async fn interactive(
    orchestrator: &Orchestrator,
    top_k: usize,
    retrieve_only: bool,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        // A failed query is reported and the session continues.
        if let Err(e) = answer(orchestrator, query, top_k, retrieve_only).await {
            tracing::error!(error = %e, "Query failed");
        }
    }

    let stats = orchestrator.cache_stats();
    tracing::info!(
        cache_enabled = stats.enabled,
        cache_size = stats.size,
        "Session ended"
    );
    Ok(())
}

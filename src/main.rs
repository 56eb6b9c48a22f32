//! Ragline server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use ragline::adapters::http::ChatHttpServer;
use ragline::infrastructure::config::ConfigLoader;
use ragline::infrastructure::groq::GroqClient;
use ragline::infrastructure::knowledge::initialize_knowledge_base;
use ragline::infrastructure::logging::init_logging;
use ragline::services::{Assistant, KnowledgeBase};

#[derive(Parser)]
#[command(name = "ragline", version, about = "Retrieval-augmented chat service")]
struct Cli {
    /// Path to a YAML config file (default: ragline.yaml + RAGLINE_* env)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Failed to start server: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config.logging);

    // The index is built before the listener opens: grounded requests never
    // race a half-built corpus.
    let index = initialize_knowledge_base(&config.knowledge)?;
    let knowledge = Arc::new(KnowledgeBase::ready(index));

    let model = Arc::new(GroqClient::new(config.llm.clone())?);
    let assistant = Arc::new(Assistant::new(model, knowledge, config.assistant.clone()));

    ChatHttpServer::new(config.server.clone(), assistant)
        .serve()
        .await
}

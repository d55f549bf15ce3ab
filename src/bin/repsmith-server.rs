// ABOUTME: Server binary for the repsmith fitness backend
// ABOUTME: Loads configuration, runs migrations, wires collaborators, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # repsmith Server Binary
//!
//! Starts the HTTP server with the plan generation pipeline wired to the
//! configured LLM provider, similarity-search service, and SQLite storage.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use repsmith::config::{LlmConfig, RetrievalConfig, ServerConfig};
use repsmith::database::SqliteStore;
use repsmith::llm::{ChatProvider, LlmProvider};
use repsmith::logging;
use repsmith::plan::PlanGenerator;
use repsmith::retrieval::HttpSnippetSource;
use repsmith::routes::{router, ServerResources};

#[derive(Parser)]
#[command(name = "repsmith-server")]
#[command(about = "repsmith - fitness backend with LLM-grounded workout plan generation")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env();
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Starting repsmith server");
    info!("{}", config.summary());

    let connect_options: SqliteConnectOptions = config
        .database_url
        .parse::<SqliteConnectOptions>()
        .context("Invalid database URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(SqliteStore::new(pool));
    store.migrate().await?;
    info!("Database initialized");

    let llm_config = LlmConfig::from_env()?;
    let provider = Arc::new(ChatProvider::from_config(&llm_config)?);
    info!(
        "LLM provider ready: {} (model {})",
        provider.display_name(),
        llm_config.model
    );

    let retrieval_config = RetrievalConfig::from_env();
    let snippets = Arc::new(HttpSnippetSource::new(&retrieval_config));
    if retrieval_config.base_url.is_none() {
        info!("Retrieval disabled; plans will be generated without reference context");
    }

    let generator = PlanGenerator::new(
        store.clone(),
        snippets,
        provider.clone(),
        llm_config,
        retrieval_config.top_k,
    );

    let resources = Arc::new(ServerResources {
        generator,
        store,
        provider,
    });

    let app = router(resources);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

// ABOUTME: Server binary wiring configuration, logging, store, and AI collaborator
// ABOUTME: Serves the axum router with graceful shutdown on ctrl-c
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! # Toque API Server Binary
//!
//! Starts the recipe/ingredient HTTP API against the hosted record store
//! configured in the environment.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use toque_api_server::{
    config::ServerConfig,
    context::ServerResources,
    llm::ChatClient,
    logging, routes,
    store::{AirtableStore, AirtableStoreConfig},
};

#[derive(Parser)]
#[command(name = "toque-server")]
#[command(about = "Toque Kitchen API - recipes and ingredients over a hosted record store")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Toque API server");
    info!("{}", config.summary());

    let store = Arc::new(AirtableStore::new(AirtableStoreConfig::from(&config.store))?);
    let advisor = Arc::new(ChatClient::new(config.llm.clone())?);
    let resources = Arc::new(ServerResources::new(store, advisor));

    let router = routes::router(resources);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("HTTP API listening on port {}", config.http_port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

mod args;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hivemesh_store::MemoryStore;

use crate::args::Args;
use crate::handlers::{healthz, list_requests, receive_request};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let st = AppState {
        requests: Arc::new(MemoryStore::new()),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/request", post(receive_request))
        .route("/requests", get(list_requests))
        .with_state(st);

    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;
    tracing::info!(addr = %args.listen_addr, "intake listening");
    axum::serve(listener, app).await?;
    Ok(())
}

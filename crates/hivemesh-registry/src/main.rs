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

use hivemesh_store::PgStore;

use crate::args::Args;
use crate::handlers::{healthz, heartbeat, list_active_nodes, receive_request};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = PgStore::connect(&args.database_url, &args.database_password).await?;
    store.ensure_schema().await?;
    let store = Arc::new(store);

    let st = AppState {
        nodes: store.clone(),
        requests: store,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/heartbeat", post(heartbeat))
        .route("/request", post(receive_request))
        .route("/nodes", get(list_active_nodes))
        .with_state(st);

    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;
    tracing::info!(addr = %args.listen_addr, "registry listening");
    axum::serve(listener, app).await?;
    Ok(())
}

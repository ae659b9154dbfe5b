//! HTTP API.
//!
//! Startup order:
//! 1. Load the song catalogue and build the similarity index.
//! 2. Construct the music agent from the resolved [`AgentConfig`].
//! 3. Build the router and serve until Ctrl-C / SIGTERM.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use eyre::Result;
use tracing::{info, warn};

use crate::agent::MusicAgent;
use crate::config::{AgentConfig, ServerConfig};
use crate::recommender::{SongCatalog, TfidfRecommender};
use state::AppState;

/// Assemble the router with CORS and request tracing.
pub fn build(state: Arc<AppState>) -> Router {
    routes::router()
        .layer(middleware::cors_layer(&state))
        .layer(axum::middleware::from_fn(middleware::trace_requests))
        .with_state(state)
}

pub async fn serve(server_config: ServerConfig, agent_config: AgentConfig) -> Result<()> {
    let catalog = SongCatalog::load(&server_config.dataset_path)?;
    if catalog.is_empty() {
        warn!(path = %server_config.dataset_path, "song catalogue is empty; every lookup will be not found");
    }
    let recommender = Arc::new(TfidfRecommender::new(catalog));

    let agent = Arc::new(MusicAgent::new(agent_config, recommender));
    info!(
        provider = agent.provider(),
        ready = agent.is_ready(),
        "music agent initialised"
    );

    let addr: SocketAddr = server_config.bind_address.parse()?;
    let state = Arc::new(AppState {
        config: Arc::new(server_config),
        agent,
    });
    let app = build(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

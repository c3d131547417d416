//! Sensei · Lecture Dashboard Backend
//!
//! - Axum HTTP + WebSocket API driving the per-session dashboard
//!   (outline selection, PDF page sync, explanation and quiz panels)
//! - Pre-computed dataset loaded once in the background at boot
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   DASHBOARD_CONFIG_PATH : path to TOML config (dataset source, panel texts, limits, session idle window)
//!   DATASET_SOURCE        : file path or http(s) URL of the dataset JSON
//!   STATIC_DIR            : front-end directory (default "./static")
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod catalog;
mod selection;
mod progression;
mod dashboard;
mod session;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;
#[cfg(test)]
mod seeds;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::config::load_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = load_config_from_env();
  info!(
    target: "sensei_dashboard",
    dataset_source = %config.dataset_source,
    static_dir = %config.static_dir,
    subtopic_overrides = config.subtopic_overrides,
    "Configuration resolved"
  );
  let state = Arc::new(AppState::new(config));

  // Fire-and-forget: the dashboard reports "loading" until this resolves.
  let loader = state.clone();
  tokio::spawn(async move { loader.load_dataset().await });

  if let Some(max_idle) = state.config.session_idle() {
    info!(target: "sensei_dashboard", idle_secs = max_idle.as_secs(), "Idle session sweep enabled");
    tokio::spawn(state.clone().run_idle_sweeper(max_idle));
  }

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sensei_dashboard", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "sensei_dashboard", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "sensei_dashboard", "Shutdown signal received");
}

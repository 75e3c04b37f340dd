// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardSession;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_history::HttpHistorySource;
use crate::infrastructure::mqtt_feed::MqttLiveFeed;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;
use crate::presentation::server::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create sources (infrastructure layer)
    let history = Arc::new(HttpHistorySource::new(
        config.backend.base_url.clone(),
        config.backend.token.clone(),
        config.backend.fetch_timeout(),
    )?);
    let feed = Box::new(MqttLiveFeed::new(config.broker.clone()));

    // Create the session (application layer)
    let (session, snapshots) = DashboardSession::new(history, feed);

    // Build router (presentation layer)
    let state = Arc::new(AppState { snapshots });
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(device = %config.broker.device, "Starting machine-telemetry dashboard on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, app, session, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

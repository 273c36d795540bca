// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::data_sources::DataSources;
use crate::application::history_repository::HistoryRepository;
use crate::application::widget_service::WidgetService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    close_history, get_history, health_check, list_tags, push_historical_batch, push_live_batch,
    select_tag, status,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load widget configuration")?;

    // Optional re-query collaborator (infrastructure layer)
    let requery = config.requery.as_ref().map(|settings| {
        Arc::new(InfluxRepository::new(settings)) as Arc<dyn HistoryRepository>
    });
    let sources = DataSources::new(config.live_feed(), config.historical_feed, requery);

    // Create the widget instance (application layer)
    let widget_service = WidgetService::new(
        config.widget_settings(),
        config.unit_registry(),
        sources,
        config.requery_timeout(),
    );

    let state = Arc::new(AppState {
        widget_service: widget_service.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/feeds/:feed/live", post(push_live_batch))
        .route("/feeds/historical", post(push_historical_batch))
        .route("/status", get(status))
        .route("/tags", get(list_tags))
        .route("/tags/:tag/select", post(select_tag))
        .route("/tags/:tag/history", get(get_history).delete(close_history))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting biogas-display service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    widget_service.teardown().await;

    Ok(())
}

mod api;
mod config;
mod constants;
mod error;
mod formatters;
mod models;
mod service;
mod session;
mod store;
mod weather;

use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreKind};
use crate::service::TourPlanner;
use crate::session::SessionController;
use crate::store::{InMemoryPreferenceStore, Neo4jPreferenceStore, PreferenceStore};
use crate::weather::WeatherClient;

async fn build_store(config: &Config) -> Result<Arc<dyn PreferenceStore>> {
    match (config.store, &config.neo4j) {
        (StoreKind::Neo4j, Some(neo4j)) => {
            Ok(Arc::new(Neo4jPreferenceStore::connect(neo4j, config.timeout).await?))
        }
        (StoreKind::Neo4j, None) => anyhow::bail!("Neo4j store selected without connection settings"),
        (StoreKind::Memory, _) => {
            tracing::warn!("Using in-memory preference store; preferences are lost on exit");
            Ok(Arc::new(InMemoryPreferenceStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tour_planner=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting tour planner");

    let config = Config::from_env()?;
    let store = build_store(&config).await?;
    let weather = match &config.weather {
        Some(weather) => Some(WeatherClient::new(weather, config.timeout)?),
        None => {
            tracing::warn!("TOUR_WEATHER_API_KEY not set; weather lookup disabled");
            None
        }
    };

    let http_addr = config.http_addr;
    let api = tokio::spawn(async move {
        if let Err(e) = api::serve(http_addr).await {
            tracing::error!("Itinerary API stopped: {}", e);
        }
    });

    let session = Arc::new(Mutex::new(SessionController::new(store, weather)));
    let server = TourPlanner::new(session.clone())
        .serve(rmcp::transport::stdio())
        .await?;
    server.waiting().await?;

    session.lock().await.shutdown().await;
    api.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

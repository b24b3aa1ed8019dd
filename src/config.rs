use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_HTTP_ADDR, DEFAULT_NEO4J_URI, DEFAULT_NEO4J_USER, DEFAULT_TIMEOUT_SECS,
    WEATHER_API_BASE,
};
use crate::error::{Result, TourError};

/// Which preference store backs the interactive session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Neo4j,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Settings resolved once at startup.
///
/// Secrets (database password, weather API key) only ever come from the
/// environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    /// Present when `store` is `Neo4j`
    pub neo4j: Option<Neo4jConfig>,
    /// `None` disables the weather lookup
    pub weather: Option<WeatherConfig>,
    pub http_addr: SocketAddr,
    pub timeout: Duration,
}

impl Config {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match var("TOUR_STORE").as_deref() {
            None | Some("neo4j") => StoreKind::Neo4j,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(TourError::Config(format!(
                    "TOUR_STORE must be 'neo4j' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let neo4j = match store {
            StoreKind::Neo4j => Some(Neo4jConfig {
                uri: var("TOUR_NEO4J_URI").unwrap_or_else(|| DEFAULT_NEO4J_URI.to_string()),
                user: var("TOUR_NEO4J_USER").unwrap_or_else(|| DEFAULT_NEO4J_USER.to_string()),
                password: var("TOUR_NEO4J_PASSWORD").ok_or_else(|| {
                    TourError::Config("TOUR_NEO4J_PASSWORD is required".to_string())
                })?,
            }),
            StoreKind::Memory => None,
        };

        let weather = var("TOUR_WEATHER_API_KEY").map(|api_key| WeatherConfig {
            api_base: var("TOUR_WEATHER_API_BASE")
                .unwrap_or_else(|| WEATHER_API_BASE.to_string()),
            api_key,
        });

        let http_addr = var("TOUR_HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| TourError::Config(format!("TOUR_HTTP_ADDR: {}", e)))?;

        let timeout_secs = match var("TOUR_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    TourError::Config(format!(
                        "TOUR_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            store,
            neo4j,
            weather,
            http_addr,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

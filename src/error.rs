use thiserror::Error;

/// Errors surfaced by the preference store, weather lookup and configuration.
///
/// A missing preference record is not an error: lookups return `None`.
#[derive(Debug, Error)]
pub enum TourError {
    #[error("Preference database unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Preference store connection is closed")]
    StoreClosed,

    #[error("Stored preferences could not be read: {0}")]
    Storage(String),

    #[error("Weather service error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TourError>;

impl From<neo4rs::Error> for TourError {
    fn from(err: neo4rs::Error) -> Self {
        TourError::ConnectionUnavailable(err.to_string())
    }
}

impl From<neo4rs::DeError> for TourError {
    fn from(err: neo4rs::DeError) -> Self {
        TourError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TourError {
    fn from(err: serde_json::Error) -> Self {
        TourError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for TourError {
    fn from(err: reqwest::Error) -> Self {
        TourError::Network(err.to_string())
    }
}

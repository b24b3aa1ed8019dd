//! HTTP endpoint mirroring the interactive itinerary flow.
//!
//! Stateless: handlers touch neither the preference store nor the session.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::formatters::format_request_itinerary;
use crate::models::{ItineraryRequest, ItineraryResponse};

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Client-side failure of a request body: missing, mistyped or not JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = if self.status == StatusCode::UNPROCESSABLE_ENTITY {
            "validation_error"
        } else {
            "bad_request"
        };
        let body = ErrorBody {
            error: error.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-itinerary/", post(generate_itinerary))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_itinerary(
    payload: Result<Json<ItineraryRequest>, JsonRejection>,
) -> Result<Json<ItineraryResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected itinerary request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    tracing::info!("Generating itinerary for {} in {}", request.name, request.city);

    Ok(Json(ItineraryResponse {
        itinerary: format_request_itinerary(&request),
    }))
}

/// Serves the router on `addr` until the listener fails.
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Itinerary API listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router()).await?;
    Ok(())
}

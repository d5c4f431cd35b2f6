//! REST API endpoints.
//!
//! Axum-based HTTP API exposing trait, item, augment and unit analyses for a
//! player, addressed either by player id or by Riot ID.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::fetch::FetchError;
use crate::service::ServiceError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InsufficientData(String),

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::InsufficientData(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InsufficientData(_) => "INSUFFICIENT_DATA",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::Unavailable(_) => "UPSTREAM_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Fetch(fetch) => match fetch {
                FetchError::SubjectNotFound(_) => ApiError::NotFound(message),
                FetchError::RateLimited { retry_after_secs } => ApiError::RateLimited {
                    message,
                    retry_after_secs,
                },
                FetchError::Timeout | FetchError::Network(_) | FetchError::Unavailable { .. } => {
                    ApiError::Unavailable(message)
                }
                FetchError::Unauthorized
                | FetchError::MissingApiKey
                | FetchError::Malformed(_)
                | FetchError::InvalidUrl(_) => ApiError::Internal(message),
            },
            ServiceError::Analysis(analysis) if analysis.is_insufficient_data() => {
                ApiError::InsufficientData(message)
            }
            ServiceError::Analysis(_) => ApiError::NotFound(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let retry_after = match &self {
            ApiError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// All endpoints, with request tracing.
pub fn build_router(state: AppState) -> Router {
    use routes::{analyze, health, units};

    Router::new()
        .route("/health", get(health::health))
        .route("/analyze-traits", get(analyze::analyze_traits))
        .route("/analyze-traits-riot-id", get(analyze::analyze_traits_riot_id))
        .route("/analyze-items", get(analyze::analyze_items))
        .route("/analyze-items-riot-id", get(analyze::analyze_items_riot_id))
        .route("/analyze-augments", get(analyze::analyze_augments))
        .route("/analyze-augments-riot-id", get(analyze::analyze_augments_riot_id))
        .route("/analyze-units", get(units::analyze_units))
        .route("/analyze-units-riot-id", get(units::analyze_units_riot_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for browser clients; `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

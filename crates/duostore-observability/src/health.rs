//! Health endpoints
//!
//! - `/healthz` - Liveness probe (always 200 OK while the process runs)
//! - `/readyz` - Readiness probe (per-store availability)
//! - `/metrics` - Prometheus metrics endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::metrics::Metrics;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<StoreReadiness>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Availability of one store role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReadiness {
    /// Logical role (primary, secondary)
    pub role: String,
    /// Backing store name, absent when the role is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Whether the role is required for the service to be ready
    pub required: bool,
    pub available: bool,
}

/// Readiness checker trait
pub trait ReadinessChecker: Send + Sync {
    fn store_statuses(&self) -> Vec<StoreReadiness>;

    /// Ready when every required store is available
    fn is_ready(&self) -> bool {
        self.store_statuses()
            .iter()
            .all(|s| s.available || !s.required)
    }
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    pub fn with_readiness_checker(
        metrics: Arc<Metrics>,
        readiness_checker: Arc<dyn ReadinessChecker>,
    ) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: None,
    })
}

/// Returns 503 Service Unavailable while a required store is missing
async fn readyz(State(state): State<HealthState>) -> Response {
    let Some(checker) = &state.readiness_checker else {
        // No readiness checker, assume ready
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                stores: None,
                message: None,
            }),
        )
            .into_response();
    };

    let stores = checker.store_statuses();
    if checker.is_ready() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                stores: Some(stores),
                message: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                stores: Some(stores),
                message: Some("A required store is unavailable".to_string()),
            }),
        )
            .into_response()
    }
}

/// Returns metrics in Prometheus text format
async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to encode metrics: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", err),
            )
                .into_response()
        }
    }
}

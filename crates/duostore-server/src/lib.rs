//! duostore server
//!
//! HTTP front end over the application facade. The binary loads
//! [`config::ServerConfig`], connects the stores through
//! [`store_factory`] and serves the router built by [`build_router`].

pub mod app;
pub mod config;
pub mod error;
pub mod metered;
pub mod routes;
pub mod store_factory;

use axum::{
    Router,
    http::{Method, header},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use duostore_core::Facade;
use duostore_observability::{HealthState, Metrics, health_router};

use app::{AppState, RegistryReadiness};

/// Browser clients may call from any origin, with credentials
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600))
}

/// Assemble the API, health and metrics routes
pub fn build_router(facade: Arc<Facade>, metrics: Arc<Metrics>) -> Router {
    let readiness = Arc::new(RegistryReadiness::new(facade.clone()));
    let health_state = HealthState::with_readiness_checker(metrics, readiness);

    routes::api_router(AppState::new(facade))
        .merge(health_router(health_state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

//! duostore observability
//!
//! This crate provides:
//! - Store metrics (Prometheus)
//! - Health, readiness and metrics endpoints

pub mod health;
pub mod metrics;

pub use health::{HealthState, ReadinessChecker, StoreReadiness, health_router};
pub use metrics::Metrics;

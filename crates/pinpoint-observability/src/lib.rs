//! Pinpoint Observability
//!
//! This crate provides observability features:
//! - Metrics collection (Prometheus)
//! - Health endpoints

pub mod health;
pub mod metrics;

pub use health::{ComponentStatus, HealthState, ReadinessChecker, health_router};
pub use metrics::Metrics;

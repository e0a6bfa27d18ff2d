//! Application state shared by the API handlers
//!
//! `AppState` holds the services built over a single `FeedbackStore`
//! implementation, so the same handlers run against SQLite in production and
//! against a temporary database in tests.

use async_trait::async_trait;
use pinpoint_core::{FeedbackService, FeedbackStore, ReportGenerator, SharingService};
use pinpoint_observability::{ComponentStatus, Metrics, ReadinessChecker};
use std::sync::Arc;

/// Application state with a dependency-injected store
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use pinpoint_core::FeedbackStore;
/// # use pinpoint_observability::Metrics;
/// # use pinpoint_server::app::AppState;
/// # fn example(store: Arc<dyn FeedbackStore>) -> Result<(), Box<dyn std::error::Error>> {
/// let state = AppState::new(store, Arc::new(Metrics::new()?));
/// let app = pinpoint_server::api::router(state, &Default::default());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AppState {
    pub feedback: FeedbackService,
    pub reports: ReportGenerator,
    pub sharing: SharingService,
    /// Backing store, used directly for token lookups
    pub store: Arc<dyn FeedbackStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn FeedbackStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            feedback: FeedbackService::new(store.clone()),
            reports: ReportGenerator::new(store.clone()),
            sharing: SharingService::new(store.clone()),
            store,
            metrics,
        }
    }
}

/// Readiness check that pings the feedback store
pub struct StoreReadiness {
    store: Arc<dyn FeedbackStore>,
}

impl StoreReadiness {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReadinessChecker for StoreReadiness {
    async fn check(&self) -> Vec<ComponentStatus> {
        match self.store.ping().await {
            Ok(()) => vec![ComponentStatus::healthy("database")],
            Err(err) => vec![ComponentStatus::unhealthy("database", err.to_string())],
        }
    }
}

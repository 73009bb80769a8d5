//! HTTP handlers and shared state.

pub mod chainhook;
pub mod health;
pub mod topics;

use crate::metrics::ReporterMetrics;
use chainhook_reporter::{ReportingApi, TopicsApi};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub reporting: Arc<dyn ReportingApi>,
    pub topics: Arc<dyn TopicsApi>,
    pub metrics: Arc<ReporterMetrics>,
}

impl AppState {
    pub fn new(reporting: Arc<dyn ReportingApi>, topics: Arc<dyn TopicsApi>) -> Self {
        Self {
            reporting,
            topics,
            metrics: Arc::new(ReporterMetrics::new()),
        }
    }
}

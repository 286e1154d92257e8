//! Application state for the API server

use crate::Config;
use crate::service::WarningService;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Cache-first warning lookups
    pub service: Arc<WarningService>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<WarningService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }
}

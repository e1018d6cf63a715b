//! Shared state passed to every route handler
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::services::SwapService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SwapService>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<SwapService>) -> Self {
        Self {
            service,
            startup_time: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}

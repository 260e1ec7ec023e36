//! Shared application state for the dashboard server

use crate::cache::{Clock, SystemClock};
use crate::pipeline::Dashboard;
use crate::time_series::PriceProvider;
use std::sync::Arc;

/// Provider type used by the server: any provider behind a box.
pub type DynProvider = Box<dyn PriceProvider>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline with its process-lifetime price cache
    pub dashboard: Arc<Dashboard<DynProvider>>,
    /// Time source for range validation and cache expiry
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates state backed by `provider` and the system clock.
    pub fn new(provider: impl PriceProvider + 'static) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: impl PriceProvider + 'static, clock: Arc<dyn Clock>) -> Self {
        let provider: DynProvider = Box::new(provider);
        AppState {
            dashboard: Arc::new(Dashboard::new(provider)),
            clock,
        }
    }
}

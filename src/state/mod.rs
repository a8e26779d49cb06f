//! Shared application state handed to every request handler.

use std::sync::Arc;

use crate::{arbiter::RoundArbiter, config::AppConfig, dao::buzz_store::BuzzStore};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state tying the store, the arbitration engine, and the
/// runtime configuration together.
///
/// The state is immutable after construction; all mutable data lives in the
/// store.
pub struct AppState {
    store: Arc<BuzzStore>,
    arbiter: RoundArbiter,
    config: AppConfig,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<BuzzStore>, config: AppConfig) -> SharedState {
        let arbiter = RoundArbiter::new(Arc::clone(&store));
        Arc::new(Self {
            store,
            arbiter,
            config,
        })
    }

    /// Arbitration engine deciding buzz presses.
    pub fn arbiter(&self) -> &RoundArbiter {
        &self.arbiter
    }

    /// Raw handle to the underlying store.
    pub fn store(&self) -> &Arc<BuzzStore> {
        &self.store
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

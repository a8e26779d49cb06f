use std::sync::Arc;

use tokio::task;
use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the backend health after probing the embedded store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = Arc::clone(state.store());
    match task::spawn_blocking(move || store.health_check()).await {
        Ok(Ok(())) => HealthResponse::ok(),
        Ok(Err(err)) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
        Err(err) => {
            warn!(error = %err, "health probe task failed");
            HealthResponse::degraded()
        }
    }
}

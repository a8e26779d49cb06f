//! Business logic powering the operator REST routes.

use tokio::task;
use tracing::info;

use crate::{dto::admin::ActionResponse, error::ServiceError, state::SharedState};

/// Close the current round and open a fresh one for the next question.
///
/// Deactivation and the insert of the replacement round run inside a single
/// write transaction, so readers never observe a moment without an active
/// round.
pub async fn reset_round(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let arbiter = state.arbiter().clone();
    task::spawn_blocking(move || arbiter.reset_round())
        .await
        .map_err(|err| ServiceError::Internal(format!("reset task failed: {err}")))??;

    info!("round reset by operator");
    Ok(ActionResponse {
        message: "Round reset. Buzzers are live again.".into(),
    })
}

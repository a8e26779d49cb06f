//! Buzz handling: validates the payload and runs the arbitration engine.

use tokio::task;
use validator::Validate;

use crate::{
    dto::buzz::{BuzzRequest, BuzzResponse},
    error::ServiceError,
    state::SharedState,
};

/// Run one buzz press through the arbitration engine.
///
/// The engine talks to SQLite synchronously, so the call is pushed onto the
/// blocking pool rather than stalling the async runtime. Whatever verdict the
/// engine reaches (winner, too late, rejected name, storage fault) comes back
/// as a regular response; only transport-level problems surface as errors.
pub async fn attempt_buzz(
    state: &SharedState,
    request: BuzzRequest,
) -> Result<BuzzResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let arbiter = state.arbiter().clone();
    let outcome = task::spawn_blocking(move || arbiter.attempt_buzz(&request.player_name))
        .await
        .map_err(|err| ServiceError::Internal(format!("buzz task failed: {err}")))?;

    Ok(outcome.into())
}

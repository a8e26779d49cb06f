//! Service helpers that expose read-only projections of the current round.

use tokio::task;

use crate::{
    dto::round::{AttemptSnapshot, RecentAttemptsQuery, RecentAttemptsResponse, RoundSnapshot},
    error::ServiceError,
    state::SharedState,
};

/// Attempts returned when the caller does not ask for a specific amount.
const DEFAULT_ATTEMPT_LIMIT: u32 = 50;
/// Ceiling on how much of the audit log a single request may page through.
const MAX_ATTEMPT_LIMIT: u32 = 200;

/// Return the round currently accepting buzzes.
pub async fn current_round(state: &SharedState) -> Result<RoundSnapshot, ServiceError> {
    let arbiter = state.arbiter().clone();
    let round = task::spawn_blocking(move || arbiter.current_round())
        .await
        .map_err(|err| ServiceError::Internal(format!("round lookup task failed: {err}")))??;

    let round = round.ok_or_else(|| ServiceError::NotFound("no round is currently open".into()))?;
    Ok(round.into())
}

/// Return the most recent buzz attempts, newest first.
pub async fn recent_attempts(
    state: &SharedState,
    query: RecentAttemptsQuery,
) -> Result<RecentAttemptsResponse, ServiceError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ATTEMPT_LIMIT)
        .min(MAX_ATTEMPT_LIMIT);

    let arbiter = state.arbiter().clone();
    let attempts = task::spawn_blocking(move || arbiter.recent_attempts(limit))
        .await
        .map_err(|err| ServiceError::Internal(format!("attempt lookup task failed: {err}")))??;

    Ok(RecentAttemptsResponse {
        attempts: attempts.into_iter().map(AttemptSnapshot::from).collect(),
    })
}

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::round::{RecentAttemptsQuery, RecentAttemptsResponse, RoundSnapshot},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current round state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/round", get(get_current_round))
        .route("/round/attempts", get(get_recent_attempts))
}

#[utoipa::path(
    get,
    path = "/round",
    tag = "round",
    responses(
        (status = 200, description = "Round currently accepting buzzes", body = RoundSnapshot),
        (status = 404, description = "No round is currently open")
    )
)]
/// Return the round currently accepting buzzes and its winner, if decided.
pub async fn get_current_round(
    State(state): State<SharedState>,
) -> Result<Json<RoundSnapshot>, AppError> {
    let payload = public_service::current_round(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/round/attempts",
    tag = "round",
    params(("limit" = Option<u32>, Query, description = "Maximum number of attempts returned (default 50)")),
    responses((status = 200, description = "Recent buzz attempts, newest first", body = RecentAttemptsResponse))
)]
/// Return the most recent buzz attempts across all rounds.
pub async fn get_recent_attempts(
    State(state): State<SharedState>,
    Query(query): Query<RecentAttemptsQuery>,
) -> Result<Json<RecentAttemptsResponse>, AppError> {
    let payload = public_service::recent_attempts(&state, query).await?;
    Ok(Json(payload))
}

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::buzz::{BuzzRequest, BuzzResponse},
    error::AppError,
    services::buzz_service,
    state::SharedState,
};

/// Player-facing buzzer endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/buzz", post(buzz))
}

/// Press the buzzer: the attempt is logged and arbitrated against the open round.
#[utoipa::path(
    post,
    path = "/buzz",
    tag = "buzz",
    request_body = BuzzRequest,
    responses(
        (status = 200, description = "Arbitration verdict for this press", body = BuzzResponse)
    )
)]
pub async fn buzz(
    State(state): State<SharedState>,
    Json(payload): Json<BuzzRequest>,
) -> Result<Json<BuzzResponse>, AppError> {
    let verdict = buzz_service::attempt_buzz(&state, payload).await?;
    Ok(Json(verdict))
}

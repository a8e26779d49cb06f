use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};

use crate::{
    dto::admin::ActionResponse, error::AppError, services::admin_service, state::SharedState,
};

const ADMIN_PIN_HEADER: &str = "x-admin-pin";

/// Operator endpoints for driving the round lifecycle.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/reset", post(reset_round))
        .route_layer(middleware::from_fn_with_state(state, require_admin_pin))
}

/// Close the current round and open a fresh one for the next question.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    params(("X-Admin-Pin" = String, Header, description = "Operator PIN configured on the server")),
    responses((status = 200, description = "Fresh round opened", body = ActionResponse))
)]
pub async fn reset_round(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::reset_round(&state).await?))
}

async fn require_admin_pin(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_PIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing admin PIN header `X-Admin-Pin`".into()))?;

    if provided == state.config().admin_pin() {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin PIN".into()))
    }
}

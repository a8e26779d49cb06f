use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz buzzer backend.
#[openapi(
    paths(
        crate::routes::buzz::buzz,
        crate::routes::round::get_current_round,
        crate::routes::round::get_recent_attempts,
        crate::routes::admin::reset_round,
        crate::routes::health::healthcheck,
    ),
    components(
        schemas(
            crate::dto::buzz::BuzzRequest,
            crate::dto::buzz::BuzzResponse,
            crate::dto::round::RoundSnapshot,
            crate::dto::round::AttemptSnapshot,
            crate::dto::round::RecentAttemptsResponse,
            crate::dto::admin::ActionResponse,
            crate::dto::health::HealthResponse,
        )
    ),
    tags(
        (name = "buzz", description = "Player-facing buzzer endpoint"),
        (name = "round", description = "Read-only round state and buzz history"),
        (name = "admin", description = "Operator endpoints gated by the configured PIN"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

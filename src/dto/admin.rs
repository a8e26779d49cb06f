//! DTO definitions used by the operator REST API and documentation layer.

use serde::Serialize;
use utoipa::ToSchema;

/// Generic action acknowledgement used by operator endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation of what happened.
    pub message: String,
}

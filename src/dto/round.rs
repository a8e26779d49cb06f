//! Read-only projections of rounds and the buzz audit log.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::{BuzzAttemptEntity, RoundEntity},
    dto::format_timestamp,
};

/// Snapshot of the round currently accepting buzzes.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundSnapshot {
    /// Monotonic round identifier.
    pub id: i64,
    /// Winning player, absent while the round is still open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    /// Server-side time of the winning press (RFC 3339, UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_time_utc: Option<String>,
}

impl From<RoundEntity> for RoundSnapshot {
    fn from(round: RoundEntity) -> Self {
        Self {
            id: round.id,
            winner_name: round.winner_name,
            winner_time_utc: round.winner_time_utc.map(format_timestamp),
        }
    }
}

/// One row of the buzz audit log.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttemptSnapshot {
    /// Round this press was logged against.
    pub round_id: i64,
    /// Player who pressed.
    pub player_name: String,
    /// Server-side receipt time (RFC 3339, UTC).
    pub buzz_time_utc: String,
    /// Whether this press won its round.
    pub was_winner: bool,
}

impl From<BuzzAttemptEntity> for AttemptSnapshot {
    fn from(attempt: BuzzAttemptEntity) -> Self {
        Self {
            round_id: attempt.round_id,
            player_name: attempt.player_name,
            buzz_time_utc: format_timestamp(attempt.buzz_time_utc),
            was_winner: attempt.was_winner,
        }
    }
}

/// Page of the most recent buzz attempts, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentAttemptsResponse {
    /// Attempt rows, newest first.
    pub attempts: Vec<AttemptSnapshot>,
}

/// Query controlling how much of the buzz log is returned.
#[derive(Debug, Deserialize)]
pub struct RecentAttemptsQuery {
    /// Maximum number of rows returned; defaults to 50, capped server-side.
    pub limit: Option<u32>,
}

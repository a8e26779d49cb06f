//! DTOs for the player-facing buzz endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{arbiter::BuzzOutcome, dto::validation::validate_player_name};

/// Payload sent when a player presses the buzzer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuzzRequest {
    /// Display name of the player pressing the buzzer.
    pub player_name: String,
}

impl Validate for BuzzRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_player_name(&self.player_name) {
            errors.add("player_name", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Arbitration verdict returned to the player who pressed.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuzzResponse {
    /// Whether this press claimed the round.
    pub won: bool,
    /// Player-facing explanation of the result.
    pub message: String,
}

impl From<BuzzOutcome> for BuzzResponse {
    fn from(outcome: BuzzOutcome) -> Self {
        Self {
            won: outcome.won,
            message: outcome.message,
        }
    }
}

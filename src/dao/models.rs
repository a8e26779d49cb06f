use time::OffsetDateTime;

/// One arbitration window persisted by the storage layer.
///
/// Exactly one round is active at a time; deactivated rounds are kept as a
/// historical ledger and never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEntity {
    /// Monotonically assigned primary key.
    pub id: i64,
    /// Whether this round is the one currently accepting buzzes.
    pub is_active: bool,
    /// Winning player's name; `None` while the round is still open.
    /// Write-once: set together with [`RoundEntity::winner_time_utc`].
    pub winner_name: Option<String>,
    /// Server-side time of the winning press, millisecond precision, UTC.
    pub winner_time_utc: Option<OffsetDateTime>,
}

/// One logged buzz press, winner or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzAttemptEntity {
    /// Monotonically assigned primary key; lower id means earlier arrival.
    pub id: i64,
    /// Round this press was logged against.
    pub round_id: i64,
    /// Trimmed display name of the player who pressed.
    pub player_name: String,
    /// Server-side receipt time, millisecond precision, UTC.
    pub buzz_time_utc: OffsetDateTime,
    /// True for at most one attempt per round.
    pub was_winner: bool,
}

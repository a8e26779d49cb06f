//! Round arbitration: decides which buzz press wins the open round.
//!
//! Many players press concurrently; exactly one per round may win, determined
//! by the order in which the store serializes their write transactions.
//! Client-reported time is never consulted.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::dao::buzz_store::{BuzzStore, RoundTx};
use crate::dao::models::{BuzzAttemptEntity, RoundEntity};
use crate::dao::storage::StorageResult;

/// Verdict for a single buzz press, as shown to the player who pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzOutcome {
    /// Whether this press claimed the round.
    pub won: bool,
    /// Player-facing explanation of the result.
    pub message: String,
}

impl BuzzOutcome {
    fn winner() -> Self {
        Self {
            won: true,
            message: "You buzzed in FIRST!".into(),
        }
    }

    fn too_late(winner: &str) -> Self {
        Self {
            won: false,
            message: format!("Too late - {winner} already buzzed first."),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            won: false,
            message: message.into(),
        }
    }
}

/// Serializes concurrent buzz presses against the single open round.
///
/// The arbiter holds no state of its own: every decision is derived from a
/// fresh read inside the store's write transaction, so any number of cloned
/// handles can run in parallel.
#[derive(Clone)]
pub struct RoundArbiter {
    store: Arc<BuzzStore>,
}

impl RoundArbiter {
    /// Build an arbiter on top of `store`.
    pub fn new(store: Arc<BuzzStore>) -> Self {
        Self { store }
    }

    /// Record a buzz press and decide whether it claimed the open round.
    ///
    /// Every press with a usable name is logged, winner or not. A storage
    /// fault rolls the whole transaction back, attempt log included, and is
    /// reported as a non-winning verdict rather than an error.
    pub fn attempt_buzz(&self, player_name: &str) -> BuzzOutcome {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return BuzzOutcome::rejected("Enter your name first.");
        }

        match self.arbitrate(player_name) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, player = player_name, "buzz attempt rolled back");
                BuzzOutcome::rejected(format!("Database error: {err}"))
            }
        }
    }

    fn arbitrate(&self, player_name: &str) -> StorageResult<BuzzOutcome> {
        self.store.write_tx(|tx| {
            let round = ensure_active_round(tx)?;
            let buzz_time = utc_now_millis();

            // Log first: the audit trail records losing presses too.
            let attempt_id = tx.insert_attempt(round.id, player_name, buzz_time)?;

            if let Some(winner) = round.winner_name {
                return Ok(BuzzOutcome::too_late(&winner));
            }

            if tx.claim_winner(round.id, player_name, buzz_time)? {
                tx.mark_attempt_winner(attempt_id)?;
                return Ok(BuzzOutcome::winner());
            }

            // A lost claim means another writer slipped in between our read
            // and the update; re-read to name whoever got there first.
            let winner = tx
                .active_round()?
                .and_then(|round| round.winner_name)
                .unwrap_or_else(|| player_name.to_owned());
            Ok(BuzzOutcome::too_late(&winner))
        })
    }

    /// Close the current round and open a fresh one with no winner.
    ///
    /// The decided round stays in the ledger untouched; repeated resets just
    /// keep producing new empty rounds.
    pub fn reset_round(&self) -> StorageResult<()> {
        self.store.write_tx(|tx| {
            tx.deactivate_active_round()?;
            let fresh = tx.insert_round()?;
            info!(round_id = fresh.id, "opened fresh round");
            Ok(())
        })
    }

    /// Round currently accepting buzzes, if any.
    pub fn current_round(&self) -> StorageResult<Option<RoundEntity>> {
        self.store.active_round()
    }

    /// Most recent buzz attempts across all rounds, newest first.
    pub fn recent_attempts(&self, limit: u32) -> StorageResult<Vec<BuzzAttemptEntity>> {
        self.store.recent_attempts(limit)
    }
}

/// Fetch the open round, creating one if bookkeeping went missing.
fn ensure_active_round(tx: &RoundTx<'_, '_>) -> StorageResult<RoundEntity> {
    match tx.active_round()? {
        Some(round) => Ok(round),
        None => tx.insert_round(),
    }
}

/// Server-side receipt time, truncated to millisecond precision.
fn utc_now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.millisecond() as u32 * 1_000_000)
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn arbiter() -> RoundArbiter {
        RoundArbiter::new(Arc::new(BuzzStore::open_in_memory().expect("store")))
    }

    #[test]
    fn first_press_wins_and_the_second_is_too_late() {
        let arbiter = arbiter();

        let alice = arbiter.attempt_buzz("Alice");
        assert!(alice.won);
        assert_eq!(alice.message, "You buzzed in FIRST!");

        let bob = arbiter.attempt_buzz("Bob");
        assert!(!bob.won);
        assert_eq!(bob.message, "Too late - Alice already buzzed first.");
    }

    #[test]
    fn reset_opens_a_fresh_round_the_next_player_can_win() {
        let arbiter = arbiter();
        assert!(arbiter.attempt_buzz("Alice").won);

        let decided = arbiter.current_round().unwrap().expect("round");
        arbiter.reset_round().unwrap();

        let fresh = arbiter.current_round().unwrap().expect("round");
        assert_ne!(decided.id, fresh.id);
        assert!(fresh.winner_name.is_none());
        assert!(fresh.winner_time_utc.is_none());

        assert!(arbiter.attempt_buzz("Bob").won);
    }

    #[test]
    fn reset_leaves_the_decided_round_in_the_ledger() {
        let store = Arc::new(BuzzStore::open_in_memory().expect("store"));
        let arbiter = RoundArbiter::new(Arc::clone(&store));

        arbiter.attempt_buzz("Alice");
        let decided = arbiter.current_round().unwrap().expect("round");
        arbiter.reset_round().unwrap();

        let archived = store.find_round(decided.id).unwrap().expect("round");
        assert!(!archived.is_active);
        assert_eq!(archived.winner_name.as_deref(), Some("Alice"));
        assert_eq!(archived.winner_time_utc, decided.winner_time_utc);
    }

    #[test]
    fn blank_names_are_rejected_without_touching_the_log() {
        let arbiter = arbiter();

        for name in ["", "   ", "\t\n"] {
            let outcome = arbiter.attempt_buzz(name);
            assert!(!outcome.won);
            assert_eq!(outcome.message, "Enter your name first.");
        }

        assert!(arbiter.recent_attempts(10).unwrap().is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_from_names() {
        let arbiter = arbiter();
        assert!(arbiter.attempt_buzz("  Alice  ").won);

        let attempts = arbiter.recent_attempts(10).unwrap();
        assert_eq!(attempts[0].player_name, "Alice");

        let round = arbiter.current_round().unwrap().expect("round");
        assert_eq!(round.winner_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn every_usable_press_is_logged_exactly_once() {
        let arbiter = arbiter();
        for name in ["Alice", "Bob", "Carol"] {
            arbiter.attempt_buzz(name);
        }

        let attempts = arbiter.recent_attempts(10).unwrap();
        assert_eq!(attempts.len(), 3);
        // Newest first.
        assert_eq!(attempts[0].player_name, "Carol");
        assert_eq!(attempts[2].player_name, "Alice");
    }

    #[test]
    fn winner_fields_match_the_single_flagged_attempt() {
        let arbiter = arbiter();
        arbiter.attempt_buzz("Alice");
        arbiter.attempt_buzz("Bob");

        let round = arbiter.current_round().unwrap().expect("round");
        let attempts = arbiter.recent_attempts(10).unwrap();

        let winners: Vec<_> = attempts.iter().filter(|a| a.was_winner).collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].round_id, round.id);
        assert_eq!(Some(winners[0].player_name.as_str()), round.winner_name.as_deref());
        assert_eq!(Some(winners[0].buzz_time_utc), round.winner_time_utc);
    }

    #[test]
    fn buzzing_heals_missing_round_bookkeeping() {
        let store = Arc::new(BuzzStore::open_in_memory().expect("store"));
        store.write_tx(|tx| tx.deactivate_active_round()).unwrap();
        assert!(store.active_round().unwrap().is_none());

        let arbiter = RoundArbiter::new(Arc::clone(&store));
        assert!(arbiter.attempt_buzz("Alice").won);

        let round = arbiter.current_round().unwrap().expect("healed round");
        assert_eq!(round.winner_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn fifty_concurrent_presses_produce_exactly_one_winner() {
        let store = Arc::new(BuzzStore::open_in_memory().expect("store"));

        let outcomes: Vec<(String, BuzzOutcome)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..50)
                .map(|n| {
                    let arbiter = RoundArbiter::new(Arc::clone(&store));
                    scope.spawn(move || {
                        let name = format!("player-{n}");
                        let outcome = arbiter.attempt_buzz(&name);
                        (name, outcome)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("buzzer thread"))
                .collect()
        });

        let winners: Vec<_> = outcomes.iter().filter(|(_, o)| o.won).collect();
        assert_eq!(winners.len(), 1);
        let winner_name = winners[0].0.as_str();

        let expected_loss = format!("Too late - {winner_name} already buzzed first.");
        for (name, outcome) in &outcomes {
            if name.as_str() != winner_name {
                assert_eq!(outcome.message, expected_loss);
            }
        }

        let arbiter = RoundArbiter::new(Arc::clone(&store));
        let round = arbiter.current_round().unwrap().expect("round");
        assert_eq!(round.winner_name.as_deref(), Some(winner_name));

        let attempts = arbiter.recent_attempts(50).unwrap();
        assert_eq!(attempts.len(), 50);
        assert_eq!(attempts.iter().filter(|a| a.was_winner).count(), 1);
    }
}

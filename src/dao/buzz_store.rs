//! SQLite-backed store for rounds and buzz attempts.
//!
//! Writers are serialized two ways: a [`Mutex`] guards the connection inside
//! this process, and every mutating flow runs inside a `BEGIN IMMEDIATE`
//! transaction so another process holding the file cannot interleave between
//! the read that informs a decision and the conditional winner update.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::dao::models::{BuzzAttemptEntity, RoundEntity};
use crate::dao::storage::{StorageError, StorageResult};

/// Durable record of rounds and buzz attempts, the unit of atomicity.
pub struct BuzzStore {
    conn: Mutex<Connection>,
}

impl BuzzStore {
    /// Open (or create) the database file at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database, used by tests.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock_conn();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS rounds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                is_active INTEGER NOT NULL DEFAULT 1,
                winner_name TEXT,
                winner_time_utc TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS buzz_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                round_id INTEGER NOT NULL,
                player_name TEXT NOT NULL,
                buzz_time_utc TEXT NOT NULL,
                was_winner INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (round_id) REFERENCES rounds(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_buzz_attempts_round
             ON buzz_attempts(round_id)",
            [],
        )?;

        // A fresh database starts with one open round, so the very first buzz
        // never races schema bootstrap.
        if query_active_round(&conn)?.is_none() {
            conn.execute("INSERT INTO rounds (is_active) VALUES (1)", [])?;
        }

        Ok(())
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `work` inside an immediate (write-locking) transaction.
    ///
    /// The transaction commits when the closure returns `Ok` and rolls back on
    /// any error, so a fault never leaves a partially recorded buzz behind.
    pub fn write_tx<T>(
        &self,
        work: impl FnOnce(&RoundTx<'_, '_>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match work(&RoundTx { tx: &tx }) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed after storage error");
                }
                Err(err)
            }
        }
    }

    /// Round currently accepting buzzes, if any.
    pub fn active_round(&self) -> StorageResult<Option<RoundEntity>> {
        let conn = self.lock_conn();
        query_active_round(&conn)
    }

    /// Fetch one round by id, active or not.
    pub fn find_round(&self, id: i64) -> StorageResult<Option<RoundEntity>> {
        let conn = self.lock_conn();
        let round = conn
            .query_row(
                "SELECT id, is_active, winner_name, winner_time_utc
                 FROM rounds WHERE id = ?1",
                [id],
                map_round_row,
            )
            .optional()?;
        Ok(round)
    }

    /// Most recent buzz attempts across all rounds, newest first.
    pub fn recent_attempts(&self, limit: u32) -> StorageResult<Vec<BuzzAttemptEntity>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, round_id, player_name, buzz_time_utc, was_winner
             FROM buzz_attempts ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit], map_attempt_row)?;
        let mut attempts = Vec::new();
        for row in rows {
            attempts.push(row?);
        }
        Ok(attempts)
    }

    /// Verify the database still answers a trivial query.
    pub fn health_check(&self) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Write-transaction view over the rounds and attempts tables.
pub struct RoundTx<'a, 'conn> {
    tx: &'a rusqlite::Transaction<'conn>,
}

impl RoundTx<'_, '_> {
    /// Round currently accepting buzzes, if any.
    ///
    /// Should external tampering ever leave more than one active round, the
    /// most recent one is returned.
    pub fn active_round(&self) -> StorageResult<Option<RoundEntity>> {
        query_active_round(self.tx)
    }

    /// Insert a fresh open round with no winner and return it.
    pub fn insert_round(&self) -> StorageResult<RoundEntity> {
        self.tx
            .execute("INSERT INTO rounds (is_active) VALUES (1)", [])?;
        Ok(RoundEntity {
            id: self.tx.last_insert_rowid(),
            is_active: true,
            winner_name: None,
            winner_time_utc: None,
        })
    }

    /// Record a buzz attempt against `round_id`, returning the new attempt id.
    pub fn insert_attempt(
        &self,
        round_id: i64,
        player_name: &str,
        buzz_time: OffsetDateTime,
    ) -> StorageResult<i64> {
        let inserted = self.tx.execute(
            "INSERT INTO buzz_attempts (round_id, player_name, buzz_time_utc, was_winner)
             VALUES (?1, ?2, ?3, 0)",
            params![round_id, player_name, format_utc(buzz_time)?],
        );

        match inserted {
            Ok(_) => Ok(self.tx.last_insert_rowid()),
            Err(err) if is_constraint_violation(&err) => Err(StorageError::NotFound(format!(
                "round {round_id} does not exist"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Set the round's winner fields only if they are still unset.
    ///
    /// Returns whether this call was the one that claimed them.
    pub fn claim_winner(
        &self,
        round_id: i64,
        player_name: &str,
        won_at: OffsetDateTime,
    ) -> StorageResult<bool> {
        let affected = self.tx.execute(
            "UPDATE rounds SET winner_name = ?1, winner_time_utc = ?2
             WHERE id = ?3 AND winner_name IS NULL",
            params![player_name, format_utc(won_at)?, round_id],
        )?;
        Ok(affected > 0)
    }

    /// Flag a single logged attempt as the one that won its round.
    pub fn mark_attempt_winner(&self, attempt_id: i64) -> StorageResult<()> {
        let affected = self.tx.execute(
            "UPDATE buzz_attempts SET was_winner = 1 WHERE id = ?1",
            [attempt_id],
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!(
                "attempt {attempt_id} does not exist"
            )));
        }
        Ok(())
    }

    /// Close whichever round is currently active. Rounds are never deleted.
    pub fn deactivate_active_round(&self) -> StorageResult<()> {
        self.tx
            .execute("UPDATE rounds SET is_active = 0 WHERE is_active = 1", [])?;
        Ok(())
    }
}

fn query_active_round(conn: &Connection) -> StorageResult<Option<RoundEntity>> {
    let round = conn
        .query_row(
            "SELECT id, is_active, winner_name, winner_time_utc
             FROM rounds WHERE is_active = 1 ORDER BY id DESC LIMIT 1",
            [],
            map_round_row,
        )
        .optional()?;
    Ok(round)
}

fn map_round_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoundEntity> {
    let winner_time: Option<String> = row.get(3)?;
    Ok(RoundEntity {
        id: row.get(0)?,
        is_active: row.get(1)?,
        winner_name: row.get(2)?,
        winner_time_utc: winner_time.map(|raw| parse_utc(&raw)).transpose()?,
    })
}

fn map_attempt_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BuzzAttemptEntity> {
    let buzz_time: String = row.get(3)?;
    Ok(BuzzAttemptEntity {
        id: row.get(0)?,
        round_id: row.get(1)?,
        player_name: row.get(2)?,
        buzz_time_utc: parse_utc(&buzz_time)?,
        was_winner: row.get(4)?,
    })
}

fn parse_utc(raw: &str) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
}

fn format_utc(timestamp: OffsetDateTime) -> StorageResult<String> {
    timestamp
        .format(&Rfc3339)
        .map_err(|err| StorageError::fault("failed to format timestamp", err))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn store() -> BuzzStore {
        BuzzStore::open_in_memory().expect("in-memory store")
    }

    #[test]
    fn fresh_database_seeds_an_open_round() {
        let store = store();
        let round = store.active_round().unwrap().expect("seeded round");
        assert!(round.is_active);
        assert!(round.winner_name.is_none());
        assert!(round.winner_time_utc.is_none());
    }

    #[test]
    fn claim_winner_succeeds_exactly_once() {
        let store = store();
        let won_at = datetime!(2025-03-01 20:15:03.250 UTC);

        let claimed = store
            .write_tx(|tx| {
                let round = tx.active_round()?.expect("active round");
                let first = tx.claim_winner(round.id, "Alice", won_at)?;
                let second = tx.claim_winner(round.id, "Bob", won_at)?;
                Ok((first, second))
            })
            .unwrap();

        assert_eq!(claimed, (true, false));
        let round = store.active_round().unwrap().unwrap();
        assert_eq!(round.winner_name.as_deref(), Some("Alice"));
        assert_eq!(round.winner_time_utc, Some(won_at));
    }

    #[test]
    fn insert_attempt_rejects_unknown_round() {
        let store = store();
        let err = store
            .write_tx(|tx| tx.insert_attempt(9999, "Alice", datetime!(2025-03-01 20:15:03 UTC)))
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn attempt_timestamps_survive_a_round_trip() {
        let store = store();
        let buzz_time = datetime!(2025-03-01 20:15:03.123 UTC);

        store
            .write_tx(|tx| {
                let round = tx.active_round()?.expect("active round");
                tx.insert_attempt(round.id, "Alice", buzz_time)
            })
            .unwrap();

        let attempts = store.recent_attempts(10).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].player_name, "Alice");
        assert_eq!(attempts[0].buzz_time_utc, buzz_time);
        assert!(!attempts[0].was_winner);
    }

    #[test]
    fn mark_attempt_winner_flips_the_flag() {
        let store = store();
        let attempt_id = store
            .write_tx(|tx| {
                let round = tx.active_round()?.expect("active round");
                let id = tx.insert_attempt(round.id, "Alice", datetime!(2025-03-01 20:15:03 UTC))?;
                tx.mark_attempt_winner(id)?;
                Ok(id)
            })
            .unwrap();

        let attempts = store.recent_attempts(10).unwrap();
        assert_eq!(attempts[0].id, attempt_id);
        assert!(attempts[0].was_winner);
    }

    #[test]
    fn reset_flow_swaps_the_active_round() {
        let store = store();
        let old = store.active_round().unwrap().unwrap();

        store
            .write_tx(|tx| {
                tx.deactivate_active_round()?;
                tx.insert_round()?;
                Ok(())
            })
            .unwrap();

        let fresh = store.active_round().unwrap().unwrap();
        assert_ne!(old.id, fresh.id);
        assert!(fresh.winner_name.is_none());

        let archived = store.find_round(old.id).unwrap().unwrap();
        assert!(!archived.is_active);
    }

    #[test]
    fn recent_attempts_returns_newest_first_and_honors_limit() {
        let store = store();
        store
            .write_tx(|tx| {
                let round = tx.active_round()?.expect("active round");
                for name in ["Alice", "Bob", "Carol"] {
                    tx.insert_attempt(round.id, name, datetime!(2025-03-01 20:15:03 UTC))?;
                }
                Ok(())
            })
            .unwrap();

        let attempts = store.recent_attempts(2).unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].player_name, "Carol");
        assert_eq!(attempts[1].player_name, "Bob");
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let store = store();
        let outcome: StorageResult<()> = store.write_tx(|tx| {
            let round = tx.active_round()?.expect("active round");
            tx.insert_attempt(round.id, "Alice", datetime!(2025-03-01 20:15:03 UTC))?;
            Err(StorageError::NotFound("injected failure".into()))
        });

        assert!(outcome.is_err());
        assert!(store.recent_attempts(10).unwrap().is_empty());
    }
}

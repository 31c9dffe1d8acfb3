//! # Sequence Counter Repository
//!
//! Durable, named, monotonically increasing counters.
//!
//! ## Increment Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  next_value("quotation")                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO counters (name, value) VALUES ('quotation', 1)            │
//! │  ON CONFLICT (name) DO UPDATE SET value = value + 1                    │
//! │  RETURNING value                                                       │
//! │       │                                                                 │
//! │       │  One statement: read, increment and write happen under        │
//! │       │  SQLite's write lock. Concurrent callers queue on the lock     │
//! │       │  (busy_timeout) and each sees a distinct value.                │
//! │       ▼                                                                 │
//! │  Ok(17)  or  Err(DbError)  ← never a guessed or cached value           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are never reused, even when the caller fails after taking one.
//! Gaps in the numbering are expected; duplicates are not possible.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for named sequence counters.
#[derive(Debug, Clone)]
pub struct SequenceCounterRepository {
    pool: SqlitePool,
}

impl SequenceCounterRepository {
    /// Creates a new SequenceCounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceCounterRepository { pool }
    }

    /// Atomically increments counter `name` and returns the new value.
    ///
    /// The first call for a name returns 1. The increment is committed
    /// before this returns.
    pub async fn next_value(&self, name: &str) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value) VALUES (?1, 1)
            ON CONFLICT (name) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        debug!(counter = %name, value, "Counter incremented");
        Ok(value)
    }

    /// Current value of counter `name`, or `None` if it has never been used.
    ///
    /// Read-only; the value may be taken by another caller at any moment.
    pub async fn current_value(&self, name: &str) -> DbResult<Option<i64>> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM counters WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Raises counter `name` to at least `floor` and returns the resulting
    /// value. Never lowers a counter.
    pub async fn advance_to(&self, name: &str, floor: i64) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value) VALUES (?1, MAX(?2, 0))
            ON CONFLICT (name) DO UPDATE SET value = MAX(value, excluded.value)
            RETURNING value
            "#,
        )
        .bind(name)
        .bind(floor)
        .fetch_one(&self.pool)
        .await?;

        debug!(counter = %name, floor, value, "Counter advanced");
        Ok(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_value_is_one() {
        let db = test_db().await;
        let counters = db.counters();

        assert_eq!(counters.current_value("quotation").await.unwrap(), None);
        assert_eq!(counters.next_value("quotation").await.unwrap(), 1);
        assert_eq!(counters.next_value("quotation").await.unwrap(), 2);
        assert_eq!(counters.current_value("quotation").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_counters_are_independent_per_key() {
        let db = test_db().await;
        let counters = db.counters();

        counters.next_value("quotation").await.unwrap();
        counters.next_value("quotation").await.unwrap();
        assert_eq!(counters.next_value("invoice").await.unwrap(), 1);
        assert_eq!(counters.next_value("quotation").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_current_value_does_not_consume() {
        let db = test_db().await;
        let counters = db.counters();

        counters.next_value("quotation").await.unwrap();
        for _ in 0..3 {
            assert_eq!(counters.current_value("quotation").await.unwrap(), Some(1));
        }
        assert_eq!(counters.next_value("quotation").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_advance_to_never_lowers() {
        let db = test_db().await;
        let counters = db.counters();

        assert_eq!(counters.advance_to("quotation", 15).await.unwrap(), 15);
        assert_eq!(counters.advance_to("quotation", 4).await.unwrap(), 15);
        assert_eq!(counters.next_value("quotation").await.unwrap(), 16);
        assert_eq!(counters.advance_to("quotation", 20).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_sequential_calls_are_strictly_increasing() {
        let db = test_db().await;
        let counters = db.counters();

        let mut prev = 0;
        for _ in 0..200 {
            let next = counters.next_value("quotation").await.unwrap();
            assert_eq!(next, prev + 1);
            prev = next;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_next_value_yields_exactly_one_to_n() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("counter.db")).max_connections(8))
            .await
            .unwrap();

        let n = 100;
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let counters = db.counters();
                tokio::spawn(async move { counters.next_value("quotation").await.unwrap() })
            })
            .collect();

        let mut values = Vec::with_capacity(n);
        for handle in handles {
            values.push(handle.await.unwrap());
        }

        values.sort();
        let len_before = values.len();
        values.dedup();
        assert_eq!(values.len(), len_before, "Found duplicate counter values");
        assert_eq!(values, (1..=n as i64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_closed_pool_is_an_error_not_a_value() {
        let db = test_db().await;
        db.close().await;
        assert!(db.counters().next_value("quotation").await.is_err());
    }
}

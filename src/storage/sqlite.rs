use std::path::{Path, PathBuf};

use backon::BlockingRetryable;
use rusqlite::{params, Connection};

use crate::contracts::{InsertOutcome, NumberStore, StoreError};
use crate::storage::RetryConfig;

/// SQLite-backed number store.
///
/// Every operation opens its own connection scoped to that single call, so
/// the store itself carries no connection state between requests. The
/// database file runs in WAL journal mode, which lets a reader proceed
/// while a writer is in flight; concurrent writers are serialized by the
/// engine and surface as `SQLITE_BUSY`, which the insert path retries.
pub struct SqliteStore {
    path: PathBuf,
    retry: RetryConfig,
}

impl SqliteStore {
    /// Opens or creates the database at the given path.
    ///
    /// Switches the file to WAL journaling and creates the numbers table
    /// if it is missing. WAL is recorded in the database file itself, so
    /// the per-operation connections opened later inherit it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            retry: RetryConfig::default(),
        };

        let conn = store.connection()?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            tracing::warn!(mode = %mode, "journal mode switch refused, falling back");
        }
        conn.execute(
            "CREATE TABLE IF NOT EXISTS numbers (number INTEGER PRIMARY KEY)",
            [],
        )?;

        Ok(store)
    }

    /// Replaces the insert retry schedule (tests use short delays).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    fn try_max(&self) -> Result<i64, StoreError> {
        let conn = self.connection()?;
        let max: Option<i64> =
            conn.query_row("SELECT MAX(number) FROM numbers", [], |row| row.get(0))?;
        Ok(max.unwrap_or(-1))
    }

    fn try_exists(&self, number: i64) -> Result<bool, StoreError> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM numbers WHERE number = ?1",
            params![number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Single insert attempt; the retry schedule lives in `insert`.
    fn try_insert(&self, number: i64) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute("INSERT INTO numbers (number) VALUES (?1)", params![number])?;
        Ok(())
    }
}

impl NumberStore for SqliteStore {
    fn max(&self) -> i64 {
        match self.try_max() {
            Ok(max) => max,
            Err(e) => {
                tracing::warn!(error = %e, "max lookup failed, reporting empty store");
                -1
            }
        }
    }

    fn exists(&self, number: i64) -> bool {
        match self.try_exists(number) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(number, error = %e, "existence check failed, reporting absent");
                false
            }
        }
    }

    fn insert(&self, number: i64) -> InsertOutcome {
        let attempt = || self.try_insert(number);
        let result = attempt
            .retry(self.retry.backoff())
            .when(|e: &StoreError| e.is_busy())
            .notify(|err, dur| {
                tracing::warn!(
                    number,
                    error = %err,
                    retry_in = ?dur,
                    "database locked, retrying insert"
                );
            })
            .call();

        match result {
            Ok(()) => InsertOutcome::Inserted,
            Err(e) if e.is_constraint() => InsertOutcome::AlreadyExists,
            Err(e) => {
                tracing::error!(number, error = %e, "insert failed");
                InsertOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("numbers.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn empty_store_reports_max_minus_one() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.max(), -1);
    }

    #[test]
    fn insert_then_exists_and_max() {
        let (store, _dir) = create_test_store();

        assert_eq!(store.insert(6), InsertOutcome::Inserted);
        assert!(store.exists(6));
        assert!(!store.exists(5));
        assert_eq!(store.max(), 6);

        assert_eq!(store.insert(11), InsertOutcome::Inserted);
        assert_eq!(store.max(), 11);
    }

    #[test]
    fn duplicate_insert_reports_already_exists() {
        let (store, _dir) = create_test_store();

        assert_eq!(store.insert(6), InsertOutcome::Inserted);
        assert_eq!(store.insert(6), InsertOutcome::AlreadyExists);

        // Still exactly one row for that value.
        assert!(store.exists(6));
        assert_eq!(store.max(), 6);
    }

    #[test]
    fn constraint_error_classification() {
        let (store, _dir) = create_test_store();
        store.try_insert(1).unwrap();

        let err = store.try_insert(1).unwrap_err();
        assert!(err.is_constraint());
        assert!(!err.is_busy());
    }
}

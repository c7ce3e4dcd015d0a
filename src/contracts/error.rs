use thiserror::Error;

/// Errors surfaced by the storage layer.
///
/// Classification happens once, in the `From<rusqlite::Error>` impl below.
/// No raw engine error leaves the storage module.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("database is locked: {0}")]
    Busy(String),

    #[error("uniqueness violation: {0}")]
    Constraint(String),
}

impl StoreError {
    /// True for transient lock contention worth retrying.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self, StoreError::Busy(_))
    }

    /// True when an insert collided with an already-stored number.
    #[inline]
    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
                rusqlite::ErrorCode::ConstraintViolation => StoreError::Constraint(e.to_string()),
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    StoreError::Busy(e.to_string())
                }
                _ => StoreError::Sqlite(e.to_string()),
            },
            _ => StoreError::Sqlite(e.to_string()),
        }
    }
}

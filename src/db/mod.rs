pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// The database file cannot be reached, opened, locked or authorized.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        if is_connectivity_failure(&err) {
            Self::StoreUnavailable(err.to_string())
        } else {
            Self::Sqlite(err)
        }
    }
}

/// SQLite result codes meaning "the store cannot serve requests",
/// as opposed to a bad statement or bad data.
fn is_connectivity_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
                | ErrorCode::AuthorizationForStatementDenied
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::DiskFull
        ),
        rusqlite::Error::InvalidPath(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn cannot_open_maps_to_unavailable() {
        let err = DatabaseError::from(failure(rusqlite::ffi::SQLITE_CANTOPEN));
        assert!(matches!(err, DatabaseError::StoreUnavailable(_)));
    }

    #[test]
    fn busy_maps_to_unavailable() {
        let err = DatabaseError::from(failure(rusqlite::ffi::SQLITE_BUSY));
        assert!(matches!(err, DatabaseError::StoreUnavailable(_)));
    }

    #[test]
    fn constraint_stays_sqlite_error() {
        let err = DatabaseError::from(failure(rusqlite::ffi::SQLITE_CONSTRAINT));
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }

    #[test]
    fn query_returned_no_rows_stays_sqlite_error() {
        let err = DatabaseError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }
}

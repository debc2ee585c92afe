use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A uniqueness or foreign key constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The blocking database task panicked or was cancelled
    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RepositoryError::Conflict(
                    message.clone().unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            other => RepositoryError::Sqlite(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');").unwrap();

        let err: RepositoryError = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err().into();
        assert!(matches!(err, RepositoryError::Conflict(_)), "got {:?}", err);
    }

    #[test]
    fn test_other_sqlite_errors_stay_sqlite() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::Sqlite(_)));
    }
}

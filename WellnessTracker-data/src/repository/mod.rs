// Repository module structure
pub mod errors;
mod goal;
mod reminder;
mod tip;

use rusqlite::Connection;

use crate::database::DatabasePool;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use goal::{GoalRepositoryTrait, SqliteGoalRepository};
pub use reminder::{ReminderRepositoryTrait, SqliteReminderRepository};
pub use tip::{HealthTipRepositoryTrait, SqliteHealthTipRepository};

// Test doubles for callers that need to simulate storage failures
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::tip::tests::MockHealthTipRepository;
}

/// Run a closure against a pooled connection on the blocking thread pool
///
/// rusqlite is synchronous, so every repository call hops off the async
/// executor before touching the database.
pub(crate) async fn with_connection<T, F>(pool: &DatabasePool, f: F) -> Result<T, RepositoryError>
where
    F: FnOnce(&mut Connection) -> Result<T, RepositoryError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut *conn)
    })
    .await?
}

/// Current time as stored in timestamp columns
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

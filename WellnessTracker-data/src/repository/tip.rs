use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::tip::{HealthTip, NewHealthTip};
use super::errors::RepositoryError;
use super::{now_timestamp, with_connection};

const TIP_COLUMNS: &str = "id, title, content, category, is_active, display_date, created_at";

/// Repository trait for shared health tips
#[async_trait]
pub trait HealthTipRepositoryTrait: Send + Sync {
    /// All active tips, latest display date first
    async fn list_active(&self) -> Result<Vec<HealthTip>, RepositoryError>;

    /// The newest active tip pinned to the given day, if any
    async fn pinned_for(&self, date: &str) -> Result<Option<HealthTip>, RepositoryError>;

    /// Insert a new tip
    async fn create(&self, tip: NewHealthTip) -> Result<HealthTip, RepositoryError>;

    /// Insert a tip unless one with the same title exists. Returns whether it was inserted.
    async fn create_if_title_absent(&self, tip: NewHealthTip) -> Result<bool, RepositoryError>;
}

/// SQLite-backed health tip repository
#[derive(Debug, Clone)]
pub struct SqliteHealthTipRepository {
    pool: DatabasePool,
}

impl SqliteHealthTipRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn tip_from_row(row: &Row<'_>) -> rusqlite::Result<HealthTip> {
    Ok(HealthTip {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        is_active: row.get(4)?,
        display_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn materialize(tip: NewHealthTip) -> HealthTip {
    HealthTip {
        id: Uuid::new_v4().to_string(),
        title: tip.title,
        content: tip.content,
        category: tip.category,
        is_active: tip.is_active,
        display_date: tip.display_date,
        created_at: now_timestamp(),
    }
}

#[async_trait]
impl HealthTipRepositoryTrait for SqliteHealthTipRepository {
    async fn list_active(&self) -> Result<Vec<HealthTip>, RepositoryError> {
        with_connection(&self.pool, |conn| {
            let sql = format!(
                "SELECT {} FROM health_tips WHERE is_active = 1
                 ORDER BY display_date DESC, created_at DESC",
                TIP_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let tips = stmt
                .query_map([], tip_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tips)
        })
        .await
    }

    async fn pinned_for(&self, date: &str) -> Result<Option<HealthTip>, RepositoryError> {
        let date = date.to_string();
        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM health_tips WHERE is_active = 1 AND display_date = ?1
                 ORDER BY created_at DESC LIMIT 1",
                TIP_COLUMNS
            );
            let tip = conn.query_row(&sql, params![date], tip_from_row).optional()?;
            Ok(tip)
        })
        .await
    }

    async fn create(&self, tip: NewHealthTip) -> Result<HealthTip, RepositoryError> {
        let tip = materialize(tip);
        with_connection(&self.pool, move |conn| {
            let sql = format!("INSERT INTO health_tips ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", TIP_COLUMNS);
            conn.execute(
                &sql,
                params![tip.id, tip.title, tip.content, tip.category, tip.is_active, tip.display_date, tip.created_at],
            )?;
            debug!("Stored health tip {}", tip.id);
            Ok(tip)
        })
        .await
    }

    async fn create_if_title_absent(&self, tip: NewHealthTip) -> Result<bool, RepositoryError> {
        let tip = materialize(tip);
        with_connection(&self.pool, move |conn| {
            // The unique title index turns a concurrent duplicate into a no-op
            let sql = format!(
                "INSERT OR IGNORE INTO health_tips ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                TIP_COLUMNS
            );
            let inserted = conn.execute(
                &sql,
                params![tip.id, tip.title, tip.content, tip.category, tip.is_active, tip.display_date, tip.created_at],
            )?;
            Ok(inserted > 0)
        })
        .await
    }
}

/// Mock health tip repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// In-memory tip repository that can be told to fail every call
    #[derive(Debug, Clone, Default)]
    pub struct MockHealthTipRepository {
        tips: Vec<HealthTip>,
        fail: bool,
    }

    impl MockHealthTipRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined tips
        pub fn with_tips(tips: Vec<HealthTip>) -> Self {
            Self { tips, fail: false }
        }

        /// Create a mock repository whose every call returns a database error
        pub fn failing() -> Self {
            Self { tips: Vec::new(), fail: true }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::Sqlite(rusqlite::Error::InvalidQuery))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl HealthTipRepositoryTrait for MockHealthTipRepository {
        async fn list_active(&self) -> Result<Vec<HealthTip>, RepositoryError> {
            self.check()?;
            Ok(self.tips.iter().filter(|t| t.is_active).cloned().collect())
        }

        async fn pinned_for(&self, date: &str) -> Result<Option<HealthTip>, RepositoryError> {
            self.check()?;
            Ok(self
                .tips
                .iter()
                .find(|t| t.is_active && t.display_date.as_deref() == Some(date))
                .cloned())
        }

        async fn create(&self, tip: NewHealthTip) -> Result<HealthTip, RepositoryError> {
            self.check()?;
            Ok(materialize(tip))
        }

        async fn create_if_title_absent(&self, tip: NewHealthTip) -> Result<bool, RepositoryError> {
            self.check()?;
            Ok(!self.tips.iter().any(|t| t.title == tip.title))
        }
    }

}

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::goal::{GoalFilter, GoalLog, NewWellnessGoal, WellnessGoal, MAX_STORED_VALUE};
use super::errors::RepositoryError;
use super::{now_timestamp, with_connection};

const GOAL_COLUMNS: &str = "id, user_id, goal_type, title, target_value, current_value, unit, \
                            date, is_completed, extra_data, created_at, updated_at";

/// Repository trait for wellness goals and their progress logs
///
/// Every lookup is scoped to the owning user; a goal that belongs to someone
/// else behaves exactly like a missing one.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    /// Insert a new goal. Fails with `Conflict` when the user already has a
    /// goal of the same type on the same day.
    async fn create(&self, goal: NewWellnessGoal) -> Result<WellnessGoal, RepositoryError>;

    /// Insert goals that do not collide with an existing (user, type, date)
    /// row and silently skip the rest. Returns the number inserted.
    async fn create_if_absent(&self, goals: Vec<NewWellnessGoal>) -> Result<usize, RepositoryError>;

    /// List a user's goals, newest day first, then by goal type
    async fn list(&self, user_id: &str, filter: GoalFilter) -> Result<Vec<WellnessGoal>, RepositoryError>;

    /// Get a goal by ID
    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<WellnessGoal>, RepositoryError>;

    /// Persist every mutable column of an existing goal
    async fn update(&self, goal: WellnessGoal) -> Result<WellnessGoal, RepositoryError>;

    /// Delete a goal together with its logs. Returns false if nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Append a log entry and add its value to the goal's running total in
    /// one transaction. Returns `None` if the goal does not exist and
    /// `Validation` if the new total would not fit the stored precision.
    async fn log_progress(
        &self,
        user_id: &str,
        goal_id: &str,
        value: f64,
        notes: Option<String>,
    ) -> Result<Option<WellnessGoal>, RepositoryError>;

    /// List the log entries of a goal, most recent first
    async fn list_logs(&self, user_id: &str, goal_id: &str) -> Result<Vec<GoalLog>, RepositoryError>;
}

/// SQLite-backed goal repository
#[derive(Debug, Clone)]
pub struct SqliteGoalRepository {
    pool: DatabasePool,
}

impl SqliteGoalRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<WellnessGoal> {
    Ok(WellnessGoal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        goal_type: row.get(2)?,
        title: row.get(3)?,
        target_value: row.get(4)?,
        current_value: row.get(5)?,
        unit: row.get(6)?,
        date: row.get(7)?,
        is_completed: row.get(8)?,
        extra_data: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn fetch_goal(conn: &Connection, user_id: &str, id: &str) -> Result<Option<WellnessGoal>, RepositoryError> {
    let sql = format!("SELECT {} FROM wellness_goals WHERE id = ?1 AND user_id = ?2", GOAL_COLUMNS);
    let goal = conn.query_row(&sql, params![id, user_id], goal_from_row).optional()?;
    Ok(goal)
}

fn insert_goal(conn: &Connection, goal: &WellnessGoal, or_ignore: bool) -> Result<usize, RepositoryError> {
    let verb = if or_ignore { "INSERT OR IGNORE" } else { "INSERT" };
    let sql = format!(
        "{} INTO wellness_goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        verb, GOAL_COLUMNS
    );

    let inserted = conn.execute(
        &sql,
        params![
            goal.id,
            goal.user_id,
            goal.goal_type,
            goal.title,
            goal.target_value,
            goal.current_value,
            goal.unit,
            goal.date,
            goal.is_completed,
            goal.extra_data,
            goal.created_at,
            goal.updated_at,
        ],
    )?;

    Ok(inserted)
}

fn materialize(goal: NewWellnessGoal) -> WellnessGoal {
    let now = now_timestamp();
    WellnessGoal {
        id: Uuid::new_v4().to_string(),
        user_id: goal.user_id,
        goal_type: goal.goal_type,
        title: goal.title,
        target_value: goal.target_value,
        current_value: goal.current_value,
        unit: goal.unit,
        date: goal.date,
        is_completed: goal.is_completed,
        extra_data: goal.extra_data,
        created_at: now.clone(),
        updated_at: now,
    }
}

#[async_trait]
impl GoalRepositoryTrait for SqliteGoalRepository {
    async fn create(&self, goal: NewWellnessGoal) -> Result<WellnessGoal, RepositoryError> {
        let goal = materialize(goal);
        debug!("Storing wellness goal in database: id={}", goal.id);

        with_connection(&self.pool, move |conn| {
            insert_goal(conn, &goal, false)?;
            Ok(goal)
        })
        .await
    }

    async fn create_if_absent(&self, goals: Vec<NewWellnessGoal>) -> Result<usize, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            for goal in goals {
                inserted += insert_goal(&tx, &materialize(goal), true)?;
            }
            tx.commit()?;

            if inserted > 0 {
                info!("Inserted {} wellness goals", inserted);
            }
            Ok(inserted)
        })
        .await
    }

    async fn list(&self, user_id: &str, filter: GoalFilter) -> Result<Vec<WellnessGoal>, RepositoryError> {
        debug!("Listing wellness goals for user {} with {:?}", user_id, filter);

        let mut sql = format!("SELECT {} FROM wellness_goals WHERE user_id = ?", GOAL_COLUMNS);
        let mut args = vec![user_id.to_string()];

        if let Some(date) = filter.date {
            sql.push_str(" AND date = ?");
            args.push(date);
        }
        if let Some(goal_type) = filter.goal_type {
            sql.push_str(" AND goal_type = ?");
            args.push(goal_type);
        }
        if let Some(from) = filter.date_from {
            sql.push_str(" AND date >= ?");
            args.push(from);
        }
        if let Some(to) = filter.date_to {
            sql.push_str(" AND date <= ?");
            args.push(to);
        }
        sql.push_str(" ORDER BY date DESC, goal_type ASC");

        with_connection(&self.pool, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let goals = stmt
                .query_map(params_from_iter(args.iter()), goal_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(goals)
        })
        .await
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<WellnessGoal>, RepositoryError> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        with_connection(&self.pool, move |conn| fetch_goal(conn, &user_id, &id)).await
    }

    async fn update(&self, mut goal: WellnessGoal) -> Result<WellnessGoal, RepositoryError> {
        goal.updated_at = now_timestamp();
        debug!("Updating wellness goal: id={}", goal.id);

        with_connection(&self.pool, move |conn| {
            let updated = conn.execute(
                "UPDATE wellness_goals
                 SET goal_type = ?1, title = ?2, target_value = ?3, current_value = ?4, unit = ?5,
                     date = ?6, is_completed = ?7, extra_data = ?8, updated_at = ?9
                 WHERE id = ?10 AND user_id = ?11",
                params![
                    goal.goal_type,
                    goal.title,
                    goal.target_value,
                    goal.current_value,
                    goal.unit,
                    goal.date,
                    goal.is_completed,
                    goal.extra_data,
                    goal.updated_at,
                    goal.id,
                    goal.user_id,
                ],
            )?;

            if updated == 0 {
                return Err(RepositoryError::NotFound(format!("wellness goal {}", goal.id)));
            }
            Ok(goal)
        })
        .await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        with_connection(&self.pool, move |conn| {
            let deleted = conn.execute(
                "DELETE FROM wellness_goals WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            if deleted > 0 {
                info!("Deleted wellness goal {}", id);
            }
            Ok(deleted > 0)
        })
        .await
    }

    async fn log_progress(
        &self,
        user_id: &str,
        goal_id: &str,
        value: f64,
        notes: Option<String>,
    ) -> Result<Option<WellnessGoal>, RepositoryError> {
        let (user_id, goal_id) = (user_id.to_string(), goal_id.to_string());

        with_connection(&self.pool, move |conn| {
            let tx = conn.transaction()?;

            let Some(goal) = fetch_goal(&tx, &user_id, &goal_id)? else {
                return Ok(None);
            };

            let total = ((goal.current_value + value) * 100.0).round() / 100.0;
            if !total.is_finite() || total.abs() > MAX_STORED_VALUE {
                // Dropping the transaction rolls it back
                return Err(RepositoryError::Validation(format!(
                    "Logging {} would take the goal total to {}, beyond the allowed {}",
                    value, total, MAX_STORED_VALUE
                )));
            }

            let now = now_timestamp();
            tx.execute(
                "INSERT INTO goal_logs (id, goal_id, value, notes, logged_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![Uuid::new_v4().to_string(), goal.id, value, notes, now],
            )?;

            tx.execute(
                "UPDATE wellness_goals
                 SET current_value = ?1,
                     is_completed = CASE
                         WHEN is_completed = 1 OR ?1 >= target_value THEN 1
                         ELSE 0
                     END,
                     updated_at = ?2
                 WHERE id = ?3",
                params![total, now, goal.id],
            )?;

            let updated = fetch_goal(&tx, &user_id, &goal_id)?;
            tx.commit()?;

            debug!("Logged {} against wellness goal {}", value, goal_id);
            Ok(updated)
        })
        .await
    }

    async fn list_logs(&self, user_id: &str, goal_id: &str) -> Result<Vec<GoalLog>, RepositoryError> {
        let (user_id, goal_id) = (user_id.to_string(), goal_id.to_string());
        with_connection(&self.pool, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.goal_id, l.value, l.notes, l.logged_at
                 FROM goal_logs l
                 JOIN wellness_goals g ON g.id = l.goal_id
                 WHERE l.goal_id = ?1 AND g.user_id = ?2
                 ORDER BY l.logged_at DESC",
            )?;
            let logs = stmt
                .query_map(params![goal_id, user_id], |row| {
                    Ok(GoalLog {
                        id: row.get(0)?,
                        goal_id: row.get(1)?,
                        value: row.get(2)?,
                        notes: row.get(3)?,
                        logged_at: row.get(4)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::in_memory_pool;

    fn repository() -> SqliteGoalRepository {
        SqliteGoalRepository::new(in_memory_pool().unwrap())
    }

    fn new_goal(user_id: &str, goal_type: &str, date: &str, target: f64) -> NewWellnessGoal {
        NewWellnessGoal {
            user_id: user_id.to_string(),
            goal_type: goal_type.to_string(),
            title: format!("{} goal", goal_type),
            target_value: target,
            current_value: 0.0,
            unit: "units".to_string(),
            date: date.to_string(),
            is_completed: false,
            extra_data: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_goal() {
        let repo = repository();
        let created = repo.create(new_goal("alice", "steps", "2024-03-01", 6000.0)).await.unwrap();

        let fetched = repo.get_by_id("alice", &created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        // Other users cannot see it
        assert!(repo.get_by_id("bob", &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_goal_is_conflict() {
        let repo = repository();
        repo.create(new_goal("alice", "steps", "2024-03-01", 6000.0)).await.unwrap();

        let err = repo.create(new_goal("alice", "steps", "2024-03-01", 8000.0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)), "got {:?}", err);

        // Same type on another day, or for another user, is fine
        repo.create(new_goal("alice", "steps", "2024-03-02", 6000.0)).await.unwrap();
        repo.create(new_goal("bob", "steps", "2024-03-01", 6000.0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_if_absent_skips_existing() {
        let repo = repository();
        repo.create(new_goal("alice", "steps", "2024-03-01", 10000.0)).await.unwrap();

        let inserted = repo
            .create_if_absent(vec![
                new_goal("alice", "steps", "2024-03-01", 6000.0),
                new_goal("alice", "sleep", "2024-03-01", 8.0),
            ])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let goals = repo.list("alice", GoalFilter::default()).await.unwrap();
        assert_eq!(goals.len(), 2);
        let steps = goals.iter().find(|g| g.goal_type == "steps").unwrap();
        assert_eq!(steps.target_value, 10000.0);
    }

    #[tokio::test]
    async fn test_list_filters_and_ordering() {
        let repo = repository();
        repo.create(new_goal("alice", "steps", "2024-03-01", 6000.0)).await.unwrap();
        repo.create(new_goal("alice", "sleep", "2024-03-03", 8.0)).await.unwrap();
        repo.create(new_goal("alice", "active_time", "2024-03-03", 60.0)).await.unwrap();
        repo.create(new_goal("bob", "steps", "2024-03-03", 6000.0)).await.unwrap();

        let all = repo.list("alice", GoalFilter::default()).await.unwrap();
        let order: Vec<_> = all.iter().map(|g| (g.date.as_str(), g.goal_type.as_str())).collect();
        assert_eq!(
            order,
            vec![
                ("2024-03-03", "active_time"),
                ("2024-03-03", "sleep"),
                ("2024-03-01", "steps"),
            ]
        );

        let by_date = repo
            .list("alice", GoalFilter { date: Some("2024-03-03".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 2);

        let by_type = repo
            .list("alice", GoalFilter { goal_type: Some("steps".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_type.len(), 1);

        let ranged = repo
            .list(
                "alice",
                GoalFilter {
                    date_from: Some("2024-03-02".into()),
                    date_to: Some("2024-03-03".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[tokio::test]
    async fn test_log_progress_accumulates_and_completes() {
        let repo = repository();
        let goal = repo.create(new_goal("alice", "water", "2024-03-01", 8.0)).await.unwrap();

        let after_first = repo
            .log_progress("alice", &goal.id, 3.0, Some("morning".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after_first.current_value, 3.0);
        assert!(!after_first.is_completed);

        let after_second = repo.log_progress("alice", &goal.id, 5.0, None).await.unwrap().unwrap();
        assert_eq!(after_second.current_value, 8.0);
        assert!(after_second.is_completed);

        let logs = repo.list_logs("alice", &goal.id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].value, 5.0);
        assert_eq!(logs[1].notes.as_deref(), Some("morning"));
    }

    #[tokio::test]
    async fn test_log_progress_rejects_total_beyond_stored_range() {
        let repo = repository();
        let goal = repo.create(new_goal("alice", "water", "2024-03-01", 10.0)).await.unwrap();

        let first = repo.log_progress("alice", &goal.id, 99_999_999.0, None).await.unwrap().unwrap();
        assert_eq!(first.current_value, 99_999_999.0);

        let err = repo.log_progress("alice", &goal.id, 99_999_999.0, None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)), "got {:?}", err);

        // Nothing from the rejected call is kept
        let stored = repo.get_by_id("alice", &goal.id).await.unwrap().unwrap();
        assert_eq!(stored.current_value, 99_999_999.0);
        assert_eq!(repo.list_logs("alice", &goal.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_progress_on_foreign_goal_is_none() {
        let repo = repository();
        let goal = repo.create(new_goal("alice", "water", "2024-03-01", 8.0)).await.unwrap();

        assert!(repo.log_progress("bob", &goal.id, 1.0, None).await.unwrap().is_none());
        assert!(repo.list_logs("alice", &goal.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = repository();
        let mut goal = repo.create(new_goal("alice", "sleep", "2024-03-01", 8.0)).await.unwrap();
        repo.log_progress("alice", &goal.id, 2.0, None).await.unwrap();

        goal.title = "Rest".to_string();
        goal.current_value = 2.0;
        let updated = repo.update(goal.clone()).await.unwrap();
        assert_eq!(updated.title, "Rest");

        assert!(!repo.delete("bob", &goal.id).await.unwrap());
        assert!(repo.delete("alice", &goal.id).await.unwrap());
        assert!(repo.get_by_id("alice", &goal.id).await.unwrap().is_none());

        let err = repo.update(goal).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}

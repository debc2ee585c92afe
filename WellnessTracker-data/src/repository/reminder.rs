use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::reminder::{NewReminder, PreventiveCareReminder};
use super::errors::RepositoryError;
use super::{now_timestamp, with_connection};

const REMINDER_COLUMNS: &str = "id, user_id, reminder_type, title, description, scheduled_date, \
                                scheduled_time, status, location, notes, is_recurring, \
                                recurrence_interval, created_at, updated_at";

/// Repository trait for preventive care reminders
#[async_trait]
pub trait ReminderRepositoryTrait: Send + Sync {
    /// Insert a new reminder
    async fn create(&self, reminder: NewReminder) -> Result<PreventiveCareReminder, RepositoryError>;

    /// List a user's reminders in schedule order, optionally by status
    async fn list(&self, user_id: &str, status: Option<String>) -> Result<Vec<PreventiveCareReminder>, RepositoryError>;

    /// Get a reminder by ID
    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<PreventiveCareReminder>, RepositoryError>;

    /// Persist every mutable column of an existing reminder
    async fn update(&self, reminder: PreventiveCareReminder) -> Result<PreventiveCareReminder, RepositoryError>;

    /// Delete a reminder. Returns false if nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Reminders still marked upcoming and scheduled on or after `from_date`
    async fn upcoming(
        &self,
        user_id: &str,
        from_date: &str,
        limit: usize,
    ) -> Result<Vec<PreventiveCareReminder>, RepositoryError>;

    /// Save a completed reminder and insert its next occurrence atomically
    async fn complete(
        &self,
        reminder: PreventiveCareReminder,
        follow_up: Option<NewReminder>,
    ) -> Result<(PreventiveCareReminder, Option<PreventiveCareReminder>), RepositoryError>;
}

/// SQLite-backed reminder repository
#[derive(Debug, Clone)]
pub struct SqliteReminderRepository {
    pool: DatabasePool,
}

impl SqliteReminderRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn reminder_from_row(row: &Row<'_>) -> rusqlite::Result<PreventiveCareReminder> {
    Ok(PreventiveCareReminder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        reminder_type: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        scheduled_date: row.get(5)?,
        scheduled_time: row.get(6)?,
        status: row.get(7)?,
        location: row.get(8)?,
        notes: row.get(9)?,
        is_recurring: row.get(10)?,
        recurrence_interval: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn insert_reminder(conn: &Connection, reminder: NewReminder) -> Result<PreventiveCareReminder, RepositoryError> {
    let now = now_timestamp();
    let reminder = PreventiveCareReminder {
        id: Uuid::new_v4().to_string(),
        user_id: reminder.user_id,
        reminder_type: reminder.reminder_type,
        title: reminder.title,
        description: reminder.description,
        scheduled_date: reminder.scheduled_date,
        scheduled_time: reminder.scheduled_time,
        status: reminder.status,
        location: reminder.location,
        notes: reminder.notes,
        is_recurring: reminder.is_recurring,
        recurrence_interval: reminder.recurrence_interval,
        created_at: now.clone(),
        updated_at: now,
    };

    let sql = format!(
        "INSERT INTO preventive_care_reminders ({}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        REMINDER_COLUMNS
    );
    conn.execute(
        &sql,
        params![
            reminder.id,
            reminder.user_id,
            reminder.reminder_type,
            reminder.title,
            reminder.description,
            reminder.scheduled_date,
            reminder.scheduled_time,
            reminder.status,
            reminder.location,
            reminder.notes,
            reminder.is_recurring,
            reminder.recurrence_interval,
            reminder.created_at,
            reminder.updated_at,
        ],
    )?;

    Ok(reminder)
}

fn update_reminder(conn: &Connection, mut reminder: PreventiveCareReminder) -> Result<PreventiveCareReminder, RepositoryError> {
    reminder.updated_at = now_timestamp();

    let updated = conn.execute(
        "UPDATE preventive_care_reminders
         SET reminder_type = ?1, title = ?2, description = ?3, scheduled_date = ?4,
             scheduled_time = ?5, status = ?6, location = ?7, notes = ?8,
             is_recurring = ?9, recurrence_interval = ?10, updated_at = ?11
         WHERE id = ?12 AND user_id = ?13",
        params![
            reminder.reminder_type,
            reminder.title,
            reminder.description,
            reminder.scheduled_date,
            reminder.scheduled_time,
            reminder.status,
            reminder.location,
            reminder.notes,
            reminder.is_recurring,
            reminder.recurrence_interval,
            reminder.updated_at,
            reminder.id,
            reminder.user_id,
        ],
    )?;

    if updated == 0 {
        return Err(RepositoryError::NotFound(format!("reminder {}", reminder.id)));
    }
    Ok(reminder)
}

#[async_trait]
impl ReminderRepositoryTrait for SqliteReminderRepository {
    async fn create(&self, reminder: NewReminder) -> Result<PreventiveCareReminder, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let reminder = insert_reminder(conn, reminder)?;
            debug!("Stored reminder {}", reminder.id);
            Ok(reminder)
        })
        .await
    }

    async fn list(&self, user_id: &str, status: Option<String>) -> Result<Vec<PreventiveCareReminder>, RepositoryError> {
        let user_id = user_id.to_string();
        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM preventive_care_reminders
                 WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
                 ORDER BY scheduled_date ASC, scheduled_time ASC",
                REMINDER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let reminders = stmt
                .query_map(params![user_id, status], reminder_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(reminders)
        })
        .await
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<PreventiveCareReminder>, RepositoryError> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM preventive_care_reminders WHERE id = ?1 AND user_id = ?2",
                REMINDER_COLUMNS
            );
            let reminder = conn.query_row(&sql, params![id, user_id], reminder_from_row).optional()?;
            Ok(reminder)
        })
        .await
    }

    async fn update(&self, reminder: PreventiveCareReminder) -> Result<PreventiveCareReminder, RepositoryError> {
        with_connection(&self.pool, move |conn| update_reminder(conn, reminder)).await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let (user_id, id) = (user_id.to_string(), id.to_string());
        with_connection(&self.pool, move |conn| {
            let deleted = conn.execute(
                "DELETE FROM preventive_care_reminders WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn upcoming(
        &self,
        user_id: &str,
        from_date: &str,
        limit: usize,
    ) -> Result<Vec<PreventiveCareReminder>, RepositoryError> {
        let (user_id, from_date) = (user_id.to_string(), from_date.to_string());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM preventive_care_reminders
                 WHERE user_id = ?1 AND status = 'upcoming' AND scheduled_date >= ?2
                 ORDER BY scheduled_date ASC, scheduled_time ASC
                 LIMIT ?3",
                REMINDER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let reminders = stmt
                .query_map(params![user_id, from_date, limit], reminder_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(reminders)
        })
        .await
    }

    async fn complete(
        &self,
        reminder: PreventiveCareReminder,
        follow_up: Option<NewReminder>,
    ) -> Result<(PreventiveCareReminder, Option<PreventiveCareReminder>), RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let tx = conn.transaction()?;
            let completed = update_reminder(&tx, reminder)?;
            let next = follow_up.map(|next| insert_reminder(&tx, next)).transpose()?;
            tx.commit()?;

            info!(
                "Completed reminder {} (next occurrence: {:?})",
                completed.id,
                next.as_ref().map(|r| r.scheduled_date.as_str())
            );
            Ok((completed, next))
        })
        .await
    }
}

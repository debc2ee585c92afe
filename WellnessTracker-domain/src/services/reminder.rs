use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::Validate;

use wellness_tracker_data::database::DatabasePool;
use wellness_tracker_data::models as data;
use wellness_tracker_data::repository::{ReminderRepositoryTrait, RepositoryError, SqliteReminderRepository};

use crate::entities::conversions;
use crate::entities::reminder::{
    check_recurrence, CompletedReminder, CreateReminderRequest, PreventiveCareReminder, ReminderStatus,
    UpdateReminderRequest,
};
use crate::services::validation::format_validation_errors;

/// Upcoming reminders returned by the reminders endpoint
pub const UPCOMING_LIMIT: usize = 5;

/// Reminder service errors
#[derive(Debug, Error)]
pub enum ReminderServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Reminder not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

/// Operations on a user's preventive care reminders
#[async_trait]
pub trait ReminderServiceTrait: Send + Sync {
    async fn list_reminders(
        &self,
        user_id: &str,
        status: Option<ReminderStatus>,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError>;

    async fn create_reminder(
        &self,
        user_id: &str,
        request: CreateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError>;

    async fn get_reminder(&self, user_id: &str, id: &str) -> Result<PreventiveCareReminder, ReminderServiceError>;

    async fn update_reminder(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError>;

    async fn delete_reminder(&self, user_id: &str, id: &str) -> Result<(), ReminderServiceError>;

    /// The next `limit` reminders still upcoming on or after `today`
    async fn upcoming_reminders(
        &self,
        user_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError>;

    /// Mark a reminder completed and schedule its next occurrence if it recurs
    async fn complete_reminder(&self, user_id: &str, id: &str) -> Result<CompletedReminder, ReminderServiceError>;
}

/// Reminder service backed by a reminder repository
pub struct ReminderService<R: ReminderRepositoryTrait> {
    repository: R,
}

impl<R: ReminderRepositoryTrait> ReminderService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(&self, err: RepositoryError) -> ReminderServiceError {
        match err {
            RepositoryError::NotFound(msg) => ReminderServiceError::NotFound(msg),
            RepositoryError::Validation(msg) | RepositoryError::Conflict(msg) => {
                ReminderServiceError::ValidationError(msg)
            }
            _ => {
                error!("Reminder repository failure: {}", err);
                ReminderServiceError::RepositoryError(err.to_string())
            }
        }
    }

    fn validate<T: Validate>(&self, request: &T) -> Result<(), ReminderServiceError> {
        request.validate().map_err(|errors| {
            let message = format_validation_errors(&errors);
            warn!("Rejected reminder input: {}", message);
            ReminderServiceError::ValidationError(message)
        })
    }

    fn to_domain(&self, reminder: data::PreventiveCareReminder) -> Result<PreventiveCareReminder, ReminderServiceError> {
        conversions::convert_to_domain_reminder(reminder).map_err(ReminderServiceError::DataError)
    }

    fn to_domain_list(
        &self,
        reminders: Vec<data::PreventiveCareReminder>,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError> {
        conversions::convert_to_domain_reminders(reminders).map_err(ReminderServiceError::DataError)
    }
}

fn recurrence_error(err: validator::ValidationError) -> ReminderServiceError {
    let message = err
        .message
        .map(|m| m.to_string())
        .unwrap_or_else(|| "Invalid recurrence".to_string());
    ReminderServiceError::ValidationError(format!("recurrence_interval: {}", message))
}

#[async_trait]
impl<R: ReminderRepositoryTrait> ReminderServiceTrait for ReminderService<R> {
    async fn list_reminders(
        &self,
        user_id: &str,
        status: Option<ReminderStatus>,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError> {
        debug!("Listing reminders for user {} (status {:?})", user_id, status);
        let reminders = self
            .repository
            .list(user_id, status.map(|s| s.as_str().to_string()))
            .await
            .map_err(|e| self.map_repo_error(e))?;
        self.to_domain_list(reminders)
    }

    async fn create_reminder(
        &self,
        user_id: &str,
        request: CreateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError> {
        self.validate(&request)?;

        let new_reminder = data::NewReminder {
            user_id: user_id.to_string(),
            reminder_type: request.reminder_type.as_str().to_string(),
            title: request.title,
            description: request.description,
            scheduled_date: conversions::format_date(request.scheduled_date),
            scheduled_time: request.scheduled_time.map(|t| t.format(conversions::TIME_FORMAT).to_string()),
            status: request.status.as_str().to_string(),
            location: request.location,
            notes: request.notes,
            is_recurring: request.is_recurring,
            recurrence_interval: request.recurrence_interval.map(i64::from),
        };

        let reminder = self.repository.create(new_reminder).await.map_err(|e| self.map_repo_error(e))?;
        info!("Created reminder {} for user {}", reminder.id, user_id);
        self.to_domain(reminder)
    }

    async fn get_reminder(&self, user_id: &str, id: &str) -> Result<PreventiveCareReminder, ReminderServiceError> {
        conversions::parse_string_to_uuid(id).map_err(ReminderServiceError::ValidationError)?;
        match self.repository.get_by_id(user_id, id).await {
            Ok(Some(reminder)) => self.to_domain(reminder),
            Ok(None) => Err(ReminderServiceError::NotFound(format!("Reminder with ID {} not found", id))),
            Err(e) => Err(self.map_repo_error(e)),
        }
    }

    async fn update_reminder(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError> {
        self.validate(&request)?;
        let mut reminder = self.get_reminder(user_id, id).await?;

        if let Some(reminder_type) = request.reminder_type {
            reminder.reminder_type = reminder_type;
        }
        if let Some(title) = request.title {
            reminder.title = title;
        }
        if let Some(description) = request.description {
            reminder.description = description;
        }
        if let Some(scheduled_date) = request.scheduled_date {
            reminder.scheduled_date = scheduled_date;
        }
        if let Some(scheduled_time) = request.scheduled_time {
            reminder.scheduled_time = scheduled_time;
        }
        if let Some(status) = request.status {
            reminder.status = status;
        }
        if let Some(location) = request.location {
            reminder.location = location;
        }
        if let Some(notes) = request.notes {
            reminder.notes = notes;
        }
        if let Some(is_recurring) = request.is_recurring {
            reminder.is_recurring = is_recurring;
        }
        if let Some(recurrence_interval) = request.recurrence_interval {
            reminder.recurrence_interval = recurrence_interval;
        }
        check_recurrence(reminder.is_recurring, reminder.recurrence_interval).map_err(recurrence_error)?;

        let updated = self
            .repository
            .update(conversions::convert_to_data_reminder(&reminder))
            .await
            .map_err(|e| self.map_repo_error(e))?;
        info!("Updated reminder {} for user {}", id, user_id);
        self.to_domain(updated)
    }

    async fn delete_reminder(&self, user_id: &str, id: &str) -> Result<(), ReminderServiceError> {
        conversions::parse_string_to_uuid(id).map_err(ReminderServiceError::ValidationError)?;
        let deleted = self.repository.delete(user_id, id).await.map_err(|e| self.map_repo_error(e))?;
        if !deleted {
            return Err(ReminderServiceError::NotFound(format!("Reminder with ID {} not found", id)));
        }
        info!("Deleted reminder {} for user {}", id, user_id);
        Ok(())
    }

    async fn upcoming_reminders(
        &self,
        user_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError> {
        let reminders = self
            .repository
            .upcoming(user_id, &conversions::format_date(today), limit)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        self.to_domain_list(reminders)
    }

    async fn complete_reminder(&self, user_id: &str, id: &str) -> Result<CompletedReminder, ReminderServiceError> {
        let mut reminder = self.get_reminder(user_id, id).await?;
        if reminder.status == ReminderStatus::Completed {
            return Err(ReminderServiceError::ValidationError(format!(
                "Reminder {} is already completed",
                id
            )));
        }

        let follow_up = reminder.next_occurrence().map(|next_date| {
            let next = PreventiveCareReminder {
                scheduled_date: next_date,
                status: ReminderStatus::Upcoming,
                notes: String::new(),
                ..reminder.clone()
            };
            conversions::convert_to_data_new_reminder(&next)
        });
        reminder.status = ReminderStatus::Completed;

        let (completed, next) = self
            .repository
            .complete(conversions::convert_to_data_reminder(&reminder), follow_up)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let completed = self.to_domain(completed)?;
        let next = next.map(|n| self.to_domain(n)).transpose()?;
        match &next {
            Some(n) => info!("Completed reminder {}; next occurrence {} on {}", id, n.id, n.scheduled_date),
            None => info!("Completed reminder {}", id),
        }

        Ok(CompletedReminder { completed, next })
    }
}

/// Create a reminder service on top of the SQLite repository
pub fn create_reminder_service(pool: DatabasePool) -> ReminderService<SqliteReminderRepository> {
    ReminderService::new(SqliteReminderRepository::new(pool))
}

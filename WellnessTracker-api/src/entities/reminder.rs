use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use wellness_tracker_domain::entities::reminder::{
    CompletedReminder, CreateReminderRequest as DomainCreateReminderRequest, PreventiveCareReminder, ReminderStatus,
    ReminderType, UpdateReminderRequest as DomainUpdateReminderRequest,
};

use crate::entities::common::{nullable, nullable_time, optional_time};

/// Public representation of a preventive care reminder
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReminderResponse {
    pub id: String,

    pub reminder_type: ReminderType,

    pub title: String,

    pub description: String,

    /// Day of the appointment (YYYY-MM-DD)
    pub scheduled_date: NaiveDate,

    /// Time of the appointment (HH:MM:SS)
    #[serde(with = "optional_time")]
    #[schema(value_type = Option<String>, example = "09:30:00")]
    pub scheduled_time: Option<NaiveTime>,

    pub status: ReminderStatus,

    pub location: String,

    pub notes: String,

    pub is_recurring: bool,

    /// Days between occurrences
    pub recurrence_interval: Option<u32>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl From<PreventiveCareReminder> for ReminderResponse {
    fn from(reminder: PreventiveCareReminder) -> Self {
        Self {
            id: reminder.id,
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
            created_at: reminder.created_at,
            updated_at: reminder.updated_at,
        }
    }
}

/// Request payload for creating a reminder. Field rules are those of the domain request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReminderRequest {
    pub reminder_type: ReminderType,

    /// 1 to 200 characters
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub scheduled_date: NaiveDate,

    /// HH:MM or HH:MM:SS
    #[serde(default, with = "optional_time")]
    #[schema(value_type = Option<String>, example = "09:30")]
    pub scheduled_time: Option<NaiveTime>,

    /// Defaults to `upcoming`
    #[serde(default)]
    pub status: ReminderStatus,

    /// Up to 200 characters
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub is_recurring: bool,

    /// Days between occurrences, at least 1. Required when `is_recurring` is true.
    pub recurrence_interval: Option<u32>,
}

impl From<CreateReminderRequest> for DomainCreateReminderRequest {
    fn from(request: CreateReminderRequest) -> Self {
        Self {
            reminder_type: request.reminder_type,
            title: request.title,
            description: request.description,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            status: request.status,
            location: request.location,
            notes: request.notes,
            is_recurring: request.is_recurring,
            recurrence_interval: request.recurrence_interval,
        }
    }
}

/// Request payload for updating a reminder. Absent fields are left unchanged;
/// `null` clears `scheduled_time` or `recurrence_interval`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateReminderRequest {
    pub reminder_type: Option<ReminderType>,

    pub title: Option<String>,

    pub description: Option<String>,

    pub scheduled_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "nullable_time::deserialize")]
    #[schema(value_type = Option<String>, example = "14:00")]
    pub scheduled_time: Option<Option<NaiveTime>>,

    pub status: Option<ReminderStatus>,

    pub location: Option<String>,

    pub notes: Option<String>,

    pub is_recurring: Option<bool>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[schema(value_type = Option<u32>)]
    pub recurrence_interval: Option<Option<u32>>,
}

impl From<UpdateReminderRequest> for DomainUpdateReminderRequest {
    fn from(request: UpdateReminderRequest) -> Self {
        Self {
            reminder_type: request.reminder_type,
            title: request.title,
            description: request.description,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            status: request.status,
            location: request.location,
            notes: request.notes,
            is_recurring: request.is_recurring,
            recurrence_interval: request.recurrence_interval,
        }
    }
}

/// Outcome of completing a reminder
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompleteReminderResponse {
    pub completed: ReminderResponse,

    /// Follow-up scheduled for a recurring reminder
    pub next: Option<ReminderResponse>,
}

impl From<CompletedReminder> for CompleteReminderResponse {
    fn from(result: CompletedReminder) -> Self {
        Self {
            completed: result.completed.into(),
            next: result.next.map(ReminderResponse::from),
        }
    }
}

/// Query parameters for listing reminders
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReminderQueryParams {
    /// Only reminders with this status
    pub status: Option<String>,
}

impl ReminderQueryParams {
    pub fn to_status(&self) -> Result<Option<ReminderStatus>, String> {
        self.status.as_deref().map(str::parse::<ReminderStatus>).transpose()
    }
}

use serde::{Deserialize, Serialize};

/// Storage model for a preventive care reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveCareReminder {
    pub id: String,
    pub user_id: String,

    /// Reminder type code (blood_test, vaccination, checkup, ...)
    pub reminder_type: String,

    pub title: String,
    pub description: String,

    /// Scheduled day (YYYY-MM-DD)
    pub scheduled_date: String,

    /// Optional time of day (HH:MM:SS)
    pub scheduled_time: Option<String>,

    /// Lifecycle status code (upcoming, completed, missed, rescheduled)
    pub status: String,

    pub location: String,
    pub notes: String,
    pub is_recurring: bool,

    /// Days between occurrences of a recurring reminder
    pub recurrence_interval: Option<i64>,

    pub created_at: String,
    pub updated_at: String,
}

/// Input data for inserting a new reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    pub user_id: String,
    pub reminder_type: String,
    pub title: String,
    pub description: String,
    pub scheduled_date: String,
    pub scheduled_time: Option<String>,
    pub status: String,
    pub location: String,
    pub notes: String,
    pub is_recurring: bool,
    pub recurrence_interval: Option<i64>,
}

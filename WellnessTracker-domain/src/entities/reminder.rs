use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Kind of preventive care event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    BloodTest,
    Vaccination,
    Checkup,
    Screening,
    Dental,
    EyeExam,
    Custom,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::BloodTest => "blood_test",
            ReminderType::Vaccination => "vaccination",
            ReminderType::Checkup => "checkup",
            ReminderType::Screening => "screening",
            ReminderType::Dental => "dental",
            ReminderType::EyeExam => "eye_exam",
            ReminderType::Custom => "custom",
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blood_test" => Ok(ReminderType::BloodTest),
            "vaccination" => Ok(ReminderType::Vaccination),
            "checkup" => Ok(ReminderType::Checkup),
            "screening" => Ok(ReminderType::Screening),
            "dental" => Ok(ReminderType::Dental),
            "eye_exam" => Ok(ReminderType::EyeExam),
            "custom" => Ok(ReminderType::Custom),
            other => Err(format!("Unknown reminder type: {}", other)),
        }
    }
}

/// Lifecycle state of a reminder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    #[default]
    Upcoming,
    Completed,
    Missed,
    Rescheduled,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Upcoming => "upcoming",
            ReminderStatus::Completed => "completed",
            ReminderStatus::Missed => "missed",
            ReminderStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(ReminderStatus::Upcoming),
            "completed" => Ok(ReminderStatus::Completed),
            "missed" => Ok(ReminderStatus::Missed),
            "rescheduled" => Ok(ReminderStatus::Rescheduled),
            other => Err(format!("Unknown reminder status: {}", other)),
        }
    }
}

/// A scheduled preventive care event owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveCareReminder {
    pub id: String,
    pub user_id: String,
    pub reminder_type: ReminderType,
    pub title: String,
    pub description: String,
    pub scheduled_date: NaiveDate,
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

impl PreventiveCareReminder {
    /// Day the next occurrence falls on, if this reminder recurs
    pub fn next_occurrence(&self) -> Option<NaiveDate> {
        if !self.is_recurring {
            return None;
        }
        let interval = self.recurrence_interval.filter(|days| *days >= 1)?;
        self.scheduled_date.checked_add_signed(Duration::days(i64::from(interval)))
    }
}

/// Recurring reminders need an interval of at least one day
pub fn check_recurrence(is_recurring: bool, recurrence_interval: Option<u32>) -> Result<(), ValidationError> {
    match (is_recurring, recurrence_interval) {
        (_, Some(0)) => {
            let mut error = ValidationError::new("recurrence_interval");
            error.message = Some("Recurrence interval must be at least 1 day".into());
            Err(error)
        }
        (true, None) => {
            let mut error = ValidationError::new("recurrence_interval");
            error.message = Some("Recurring reminders require a recurrence interval".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

fn validate_create_recurrence(request: &CreateReminderRequest) -> Result<(), ValidationError> {
    check_recurrence(request.is_recurring, request.recurrence_interval)
}

/// Request to create a reminder
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_recurrence", skip_on_field_errors = false))]
pub struct CreateReminderRequest {
    pub reminder_type: ReminderType,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub scheduled_date: NaiveDate,

    pub scheduled_time: Option<NaiveTime>,

    #[serde(default)]
    pub status: ReminderStatus,

    #[validate(length(max = 200, message = "Location cannot exceed 200 characters"))]
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub is_recurring: bool,

    pub recurrence_interval: Option<u32>,
}

/// Partial update of a reminder; absent fields are left unchanged.
///
/// The recurrence rule is checked against the merged result by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    pub reminder_type: Option<ReminderType>,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub scheduled_date: Option<NaiveDate>,

    /// `Some(None)` clears the time
    pub scheduled_time: Option<Option<NaiveTime>>,

    pub status: Option<ReminderStatus>,

    #[validate(length(max = 200, message = "Location cannot exceed 200 characters"))]
    pub location: Option<String>,

    pub notes: Option<String>,

    pub is_recurring: Option<bool>,

    /// `Some(None)` clears the interval
    pub recurrence_interval: Option<Option<u32>>,
}

/// Result of completing a reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedReminder {
    pub completed: PreventiveCareReminder,
    /// Next occurrence of a recurring reminder
    pub next: Option<PreventiveCareReminder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(is_recurring: bool, interval: Option<u32>) -> PreventiveCareReminder {
        PreventiveCareReminder {
            id: "r".to_string(),
            user_id: "u".to_string(),
            reminder_type: ReminderType::Dental,
            title: "Cleaning".to_string(),
            description: String::new(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
            scheduled_time: None,
            status: ReminderStatus::Upcoming,
            location: String::new(),
            notes: String::new(),
            is_recurring,
            recurrence_interval: interval,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_next_occurrence() {
        assert_eq!(
            reminder(true, Some(180)).next_occurrence(),
            NaiveDate::from_ymd_opt(2024, 7, 28)
        );
        assert_eq!(reminder(false, Some(180)).next_occurrence(), None);
        assert_eq!(reminder(true, None).next_occurrence(), None);
    }

    #[test]
    fn test_recurrence_rule() {
        assert!(check_recurrence(false, None).is_ok());
        assert!(check_recurrence(true, Some(30)).is_ok());
        assert!(check_recurrence(true, None).is_err());
        assert!(check_recurrence(false, Some(0)).is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateReminderRequest {
            reminder_type: ReminderType::Vaccination,
            title: "Flu shot".to_string(),
            description: String::new(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            scheduled_time: None,
            status: ReminderStatus::Upcoming,
            location: String::new(),
            notes: String::new(),
            is_recurring: true,
            recurrence_interval: None,
        };
        assert!(request.validate().is_err());

        let request = CreateReminderRequest { recurrence_interval: Some(365), ..request };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ReminderStatus::default(), ReminderStatus::Upcoming);
        assert_eq!("rescheduled".parse::<ReminderStatus>().unwrap(), ReminderStatus::Rescheduled);
        assert_eq!("eye_exam".parse::<ReminderType>().unwrap(), ReminderType::EyeExam);
        assert!("pending".parse::<ReminderStatus>().is_err());
    }
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use wellness_tracker_data::models as data;

use crate::entities::goal::{GoalFilter, GoalLog, GoalType, WellnessGoal};
use crate::entities::reminder::PreventiveCareReminder;
use crate::entities::tip::{DefaultTip, HealthTip};

// Conversion functions between domain entities and data models.
// They follow the pattern convert_to_[target_layer]_[model_name].
// Stored rows that no longer parse are reported as an error message.

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Parse a string ID to UUID, rejecting malformed identifiers
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse `HH:MM:SS` or `HH:MM`
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| format!("Invalid time '{}': {}", value, e))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

fn parse_extra_data(value: Option<String>) -> Result<Option<serde_json::Value>, String> {
    value
        .map(|raw| serde_json::from_str(&raw).map_err(|e| format!("Invalid extra_data: {}", e)))
        .transpose()
}

fn format_extra_data(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|json| json.to_string())
}

/// Convert a stored goal to the domain entity
pub fn convert_to_domain_goal(goal: data::WellnessGoal) -> Result<WellnessGoal, String> {
    Ok(WellnessGoal {
        goal_type: goal.goal_type.parse()?,
        date: parse_date(&goal.date)?,
        extra_data: parse_extra_data(goal.extra_data)?,
        created_at: parse_timestamp(&goal.created_at)?,
        updated_at: parse_timestamp(&goal.updated_at)?,
        id: goal.id,
        user_id: goal.user_id,
        title: goal.title,
        target_value: goal.target_value,
        current_value: goal.current_value,
        unit: goal.unit,
        is_completed: goal.is_completed,
    })
}

pub fn convert_to_domain_goals(goals: Vec<data::WellnessGoal>) -> Result<Vec<WellnessGoal>, String> {
    goals.into_iter().map(convert_to_domain_goal).collect()
}

/// Convert a domain goal back to its storage form for an update
pub fn convert_to_data_goal(goal: &WellnessGoal) -> data::WellnessGoal {
    data::WellnessGoal {
        id: goal.id.clone(),
        user_id: goal.user_id.clone(),
        goal_type: goal.goal_type.as_str().to_string(),
        title: goal.title.clone(),
        target_value: goal.target_value,
        current_value: goal.current_value,
        unit: goal.unit.clone(),
        date: format_date(goal.date),
        is_completed: goal.is_completed,
        extra_data: format_extra_data(&goal.extra_data),
        created_at: goal.created_at.to_rfc3339(),
        updated_at: goal.updated_at.to_rfc3339(),
    }
}

/// Build the insert model for a fresh goal with no progress
pub fn convert_to_data_new_goal(
    user_id: &str,
    goal_type: GoalType,
    title: &str,
    target_value: f64,
    unit: &str,
    date: NaiveDate,
    extra_data: &Option<serde_json::Value>,
) -> data::NewWellnessGoal {
    data::NewWellnessGoal {
        user_id: user_id.to_string(),
        goal_type: goal_type.as_str().to_string(),
        title: title.to_string(),
        target_value,
        current_value: 0.0,
        unit: unit.to_string(),
        date: format_date(date),
        // A zero target is met from the start
        is_completed: target_value <= 0.0,
        extra_data: format_extra_data(extra_data),
    }
}

pub fn convert_to_data_goal_filter(filter: &GoalFilter) -> data::GoalFilter {
    data::GoalFilter {
        date: filter.date.map(format_date),
        goal_type: filter.goal_type.map(|t| t.as_str().to_string()),
        ..Default::default()
    }
}

pub fn convert_to_domain_goal_log(log: data::GoalLog) -> Result<GoalLog, String> {
    Ok(GoalLog {
        logged_at: parse_timestamp(&log.logged_at)?,
        id: log.id,
        goal_id: log.goal_id,
        value: log.value,
        notes: log.notes,
    })
}

/// Convert a stored reminder to the domain entity
pub fn convert_to_domain_reminder(reminder: data::PreventiveCareReminder) -> Result<PreventiveCareReminder, String> {
    let recurrence_interval = reminder
        .recurrence_interval
        .map(|days| u32::try_from(days).map_err(|_| format!("Invalid recurrence interval: {}", days)))
        .transpose()?;

    Ok(PreventiveCareReminder {
        reminder_type: reminder.reminder_type.parse()?,
        scheduled_date: parse_date(&reminder.scheduled_date)?,
        scheduled_time: reminder.scheduled_time.as_deref().map(parse_time).transpose()?,
        status: reminder.status.parse()?,
        created_at: parse_timestamp(&reminder.created_at)?,
        updated_at: parse_timestamp(&reminder.updated_at)?,
        recurrence_interval,
        id: reminder.id,
        user_id: reminder.user_id,
        title: reminder.title,
        description: reminder.description,
        location: reminder.location,
        notes: reminder.notes,
        is_recurring: reminder.is_recurring,
    })
}

pub fn convert_to_domain_reminders(
    reminders: Vec<data::PreventiveCareReminder>,
) -> Result<Vec<PreventiveCareReminder>, String> {
    reminders.into_iter().map(convert_to_domain_reminder).collect()
}

pub fn convert_to_data_reminder(reminder: &PreventiveCareReminder) -> data::PreventiveCareReminder {
    data::PreventiveCareReminder {
        id: reminder.id.clone(),
        user_id: reminder.user_id.clone(),
        reminder_type: reminder.reminder_type.as_str().to_string(),
        title: reminder.title.clone(),
        description: reminder.description.clone(),
        scheduled_date: format_date(reminder.scheduled_date),
        scheduled_time: reminder.scheduled_time.map(format_time),
        status: reminder.status.as_str().to_string(),
        location: reminder.location.clone(),
        notes: reminder.notes.clone(),
        is_recurring: reminder.is_recurring,
        recurrence_interval: reminder.recurrence_interval.map(i64::from),
        created_at: reminder.created_at.to_rfc3339(),
        updated_at: reminder.updated_at.to_rfc3339(),
    }
}

/// Insert model carrying every field of a domain reminder except identity and timestamps
pub fn convert_to_data_new_reminder(reminder: &PreventiveCareReminder) -> data::NewReminder {
    data::NewReminder {
        user_id: reminder.user_id.clone(),
        reminder_type: reminder.reminder_type.as_str().to_string(),
        title: reminder.title.clone(),
        description: reminder.description.clone(),
        scheduled_date: format_date(reminder.scheduled_date),
        scheduled_time: reminder.scheduled_time.map(format_time),
        status: reminder.status.as_str().to_string(),
        location: reminder.location.clone(),
        notes: reminder.notes.clone(),
        is_recurring: reminder.is_recurring,
        recurrence_interval: reminder.recurrence_interval.map(i64::from),
    }
}

pub fn convert_to_domain_tip(tip: data::HealthTip) -> Result<HealthTip, String> {
    Ok(HealthTip {
        category: tip.category.parse()?,
        display_date: tip.display_date.as_deref().map(parse_date).transpose()?,
        created_at: Some(parse_timestamp(&tip.created_at)?),
        id: tip.id,
        title: tip.title,
        content: tip.content,
        is_active: tip.is_active,
    })
}

pub fn convert_to_data_new_tip(tip: &DefaultTip) -> data::NewHealthTip {
    data::NewHealthTip {
        title: tip.title.to_string(),
        content: tip.content.to_string(),
        category: tip.category.as_str().to_string(),
        is_active: true,
        display_date: None,
    }
}

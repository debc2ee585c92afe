pub mod dashboard;
pub mod goals;
pub mod health;
pub mod reminders;
pub mod tips;

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{NaiveDate, Utc};
use tracing::warn;
use validator::Validate;

use crate::entities::common::ErrorResponse;

// Re-export handlers for easier imports
pub use dashboard::get_dashboard;
pub use goals::{
    create_goal, delete_goal, get_goal, get_goal_logs, get_today_goals, get_weekly_progress, list_goals, log_progress,
    update_goal,
};
pub use health::health_check;
pub use reminders::{
    complete_reminder, create_reminder, delete_reminder, get_reminder, get_upcoming_reminders, list_reminders,
    update_reminder,
};
pub use tips::{get_tip_of_day, list_tips};

/// Unwrap a JSON body, convert it to its domain request and run the domain validators
pub(crate) fn validated_body<T, D>(body: Result<Json<T>, JsonRejection>) -> Result<D, ErrorResponse>
where
    T: Into<D>,
    D: Validate,
{
    let Json(payload) = body.map_err(ErrorResponse::from_json_rejection)?;
    let request: D = payload.into();
    if let Err(errors) = request.validate() {
        warn!("Request failed validation: {}", errors);
        return Err(ErrorResponse::from_validation(&errors));
    }
    Ok(request)
}

/// Current day in UTC
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

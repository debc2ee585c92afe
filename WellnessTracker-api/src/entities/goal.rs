use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use wellness_tracker_domain::entities::conversions;
use wellness_tracker_domain::entities::goal::{
    CreateGoalRequest as DomainCreateGoalRequest, GoalFilter, GoalLog, GoalType, LogProgressRequest as DomainLogProgressRequest,
    StepsSummary, UpdateGoalRequest as DomainUpdateGoalRequest, WeeklyProgress, WellnessGoal,
};

use crate::entities::common::nullable;

/// Public representation of a wellness goal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalResponse {
    pub id: String,

    pub goal_type: GoalType,

    pub title: String,

    /// Value to reach on `date`
    pub target_value: f64,

    /// Running total of logged progress
    pub current_value: f64,

    pub unit: String,

    /// Day the goal applies to (YYYY-MM-DD)
    pub date: NaiveDate,

    pub is_completed: bool,

    /// Whole percentage of the target reached, capped at 100
    pub progress_percentage: u8,

    #[schema(value_type = Option<Object>)]
    pub extra_data: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl From<WellnessGoal> for GoalResponse {
    fn from(goal: WellnessGoal) -> Self {
        let progress_percentage = goal.progress_percentage();
        Self {
            id: goal.id,
            goal_type: goal.goal_type,
            title: goal.title,
            target_value: goal.target_value,
            current_value: goal.current_value,
            unit: goal.unit,
            date: goal.date,
            is_completed: goal.is_completed,
            progress_percentage,
            extra_data: goal.extra_data,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

/// Request payload for creating a goal. Field rules are those of the domain request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGoalRequest {
    pub goal_type: GoalType,

    /// 1 to 100 characters
    pub title: String,

    /// Between 0 and 99999999.99
    pub target_value: f64,

    /// Up to 20 characters
    #[serde(default)]
    pub unit: String,

    pub date: NaiveDate,

    #[schema(value_type = Option<Object>)]
    pub extra_data: Option<serde_json::Value>,
}

impl From<CreateGoalRequest> for DomainCreateGoalRequest {
    fn from(request: CreateGoalRequest) -> Self {
        Self {
            goal_type: request.goal_type,
            title: request.title,
            target_value: request.target_value,
            unit: request.unit,
            date: request.date,
            extra_data: request.extra_data,
        }
    }
}

/// Request payload for updating a goal. Absent fields are left unchanged;
/// `"extra_data": null` clears the stored document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGoalRequest {
    pub goal_type: Option<GoalType>,

    pub title: Option<String>,

    pub target_value: Option<f64>,

    pub current_value: Option<f64>,

    pub unit: Option<String>,

    pub date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[schema(value_type = Option<Object>)]
    pub extra_data: Option<Option<serde_json::Value>>,
}

impl From<UpdateGoalRequest> for DomainUpdateGoalRequest {
    fn from(request: UpdateGoalRequest) -> Self {
        Self {
            goal_type: request.goal_type,
            title: request.title,
            target_value: request.target_value,
            current_value: request.current_value,
            unit: request.unit,
            date: request.date,
            extra_data: request.extra_data,
        }
    }
}

/// Request payload for logging progress against a goal
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogProgressRequest {
    /// Amount added to the running total; may be negative to correct mistakes
    pub value: f64,

    /// Up to 1000 characters
    pub notes: Option<String>,
}

impl From<LogProgressRequest> for DomainLogProgressRequest {
    fn from(request: LogProgressRequest) -> Self {
        Self {
            value: request.value,
            notes: request.notes,
        }
    }
}

/// One logged progress entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalLogResponse {
    pub id: String,
    pub goal_id: String,
    pub value: f64,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl From<GoalLog> for GoalLogResponse {
    fn from(log: GoalLog) -> Self {
        Self {
            id: log.id,
            goal_id: log.goal_id,
            value: log.value,
            notes: log.notes,
            logged_at: log.logged_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepsSummaryResponse {
    /// Steps logged over the week; null without step goals
    pub total: Option<f64>,
    /// Step targets over the week; null without step goals
    pub target: Option<f64>,
}

impl From<StepsSummary> for StepsSummaryResponse {
    fn from(summary: StepsSummary) -> Self {
        Self {
            total: summary.total,
            target: summary.target,
        }
    }
}

/// Goal completion over the trailing week
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeeklyProgressResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_goals: usize,
    pub completed_goals: usize,
    /// Percentage of completed goals, one decimal place
    pub completion_rate: f64,
    pub steps_summary: StepsSummaryResponse,
    pub goals: Vec<GoalResponse>,
}

impl From<WeeklyProgress> for WeeklyProgressResponse {
    fn from(progress: WeeklyProgress) -> Self {
        Self {
            start_date: progress.start_date,
            end_date: progress.end_date,
            total_goals: progress.total_goals,
            completed_goals: progress.completed_goals,
            completion_rate: progress.completion_rate,
            steps_summary: progress.steps_summary.into(),
            goals: progress.goals.into_iter().map(GoalResponse::from).collect(),
        }
    }
}

/// Query parameters for listing goals
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct GoalQueryParams {
    /// Only goals for this day (YYYY-MM-DD)
    pub date: Option<String>,

    /// Only goals of this type
    #[serde(rename = "type")]
    pub goal_type: Option<String>,
}

impl GoalQueryParams {
    /// Parse the raw query values into a domain filter
    pub fn to_filter(&self) -> Result<GoalFilter, String> {
        let date = self.date.as_deref().map(conversions::parse_date).transpose()?;
        let goal_type = self.goal_type.as_deref().map(str::parse::<GoalType>).transpose()?;
        Ok(GoalFilter { date, goal_type })
    }
}

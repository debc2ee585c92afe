use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Largest magnitude a goal value may take
pub const MAX_GOAL_VALUE: f64 = wellness_tracker_data::models::goal::MAX_STORED_VALUE;

/// Kind of wellness goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Steps,
    ActiveTime,
    Sleep,
    Water,
    Calories,
    Custom,
}

impl GoalType {
    /// Storage code for this goal type
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Steps => "steps",
            GoalType::ActiveTime => "active_time",
            GoalType::Sleep => "sleep",
            GoalType::Water => "water",
            GoalType::Calories => "calories",
            GoalType::Custom => "custom",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps" => Ok(GoalType::Steps),
            "active_time" => Ok(GoalType::ActiveTime),
            "sleep" => Ok(GoalType::Sleep),
            "water" => Ok(GoalType::Water),
            "calories" => Ok(GoalType::Calories),
            "custom" => Ok(GoalType::Custom),
            other => Err(format!("Unknown goal type: {}", other)),
        }
    }
}

/// A daily wellness goal owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessGoal {
    pub id: String,
    pub user_id: String,
    pub goal_type: GoalType,
    pub title: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub is_completed: bool,
    pub extra_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WellnessGoal {
    /// Progress towards the target as a whole percentage, capped at 100
    pub fn progress_percentage(&self) -> u8 {
        progress_percentage(self.current_value, self.target_value)
    }

    /// Mark the goal completed once the total reaches the target.
    ///
    /// Completion is sticky: lowering the total afterwards does not clear it.
    pub fn apply_completion_rule(&mut self) {
        if self.current_value >= self.target_value {
            self.is_completed = true;
        }
    }
}

/// Whole percentage of `current` over `target`, truncated and clamped to 0..=100.
/// A zero target always reports 0.
pub fn progress_percentage(current: f64, target: f64) -> u8 {
    if target == 0.0 || !target.is_finite() || !current.is_finite() {
        return 0;
    }
    let percent = (current / target * 100.0).trunc();
    percent.clamp(0.0, 100.0) as u8
}

/// Round a value to the two decimal places goals are stored with
pub fn round_decimal(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Request to create a goal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGoalRequest {
    pub goal_type: GoalType,

    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(range(min = 0.0, max = 99999999.99, message = "Target value must be between 0 and 99999999.99"))]
    pub target_value: f64,

    #[validate(length(max = 20, message = "Unit cannot exceed 20 characters"))]
    pub unit: String,

    pub date: NaiveDate,

    pub extra_data: Option<serde_json::Value>,
}

/// Partial update of a goal; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    pub goal_type: Option<GoalType>,

    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 0.0, max = 99999999.99, message = "Target value must be between 0 and 99999999.99"))]
    pub target_value: Option<f64>,

    #[validate(range(min = -99999999.99, max = 99999999.99, message = "Current value is out of range"))]
    pub current_value: Option<f64>,

    #[validate(length(max = 20, message = "Unit cannot exceed 20 characters"))]
    pub unit: Option<String>,

    pub date: Option<NaiveDate>,

    /// `Some(None)` clears the stored document
    pub extra_data: Option<Option<serde_json::Value>>,
}

/// Request to add progress to a goal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogProgressRequest {
    #[validate(range(min = -99999999.99, max = 99999999.99, message = "Value is out of range"))]
    pub value: f64,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// One progress entry logged against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalLog {
    pub id: String,
    pub goal_id: String,
    pub value: f64,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// Filters accepted when listing goals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalFilter {
    pub date: Option<NaiveDate>,
    pub goal_type: Option<GoalType>,
}

/// Aggregated step counts over a period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsSummary {
    /// Sum of logged steps; `None` when there are no step goals
    pub total: Option<f64>,
    /// Sum of step targets; `None` when there are no step goals
    pub target: Option<f64>,
}

/// Goal completion statistics for the trailing week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_goals: usize,
    pub completed_goals: usize,
    /// Percentage of completed goals, rounded to one decimal place
    pub completion_rate: f64,
    pub steps_summary: StepsSummary,
    pub goals: Vec<WellnessGoal>,
}

impl WeeklyProgress {
    /// Summarize the goals that fall inside `[start_date, end_date]`
    pub fn from_goals(start_date: NaiveDate, end_date: NaiveDate, goals: Vec<WellnessGoal>) -> Self {
        let total_goals = goals.len();
        let completed_goals = goals.iter().filter(|g| g.is_completed).count();

        let completion_rate = if total_goals > 0 {
            (completed_goals as f64 / total_goals as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let steps: Vec<&WellnessGoal> = goals.iter().filter(|g| g.goal_type == GoalType::Steps).collect();
        let steps_summary = if steps.is_empty() {
            StepsSummary::default()
        } else {
            StepsSummary {
                total: Some(round_decimal(steps.iter().map(|g| g.current_value).sum())),
                target: Some(round_decimal(steps.iter().map(|g| g.target_value).sum())),
            }
        };

        Self {
            start_date,
            end_date,
            total_goals,
            completed_goals,
            completion_rate,
            steps_summary,
            goals,
        }
    }
}

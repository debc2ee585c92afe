use serde::{Deserialize, Serialize};

/// Largest magnitude a goal value column holds (ten digits, two of them decimals)
pub const MAX_STORED_VALUE: f64 = 99_999_999.99;

/// Storage model for a wellness goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessGoal {
    /// Unique identifier for the goal
    pub id: String,

    /// Owner of the goal
    pub user_id: String,

    /// Goal type code (steps, active_time, sleep, water, calories, custom)
    pub goal_type: String,

    pub title: String,

    pub target_value: f64,

    /// Running total of logged progress
    pub current_value: f64,

    pub unit: String,

    /// Day the goal applies to (YYYY-MM-DD)
    pub date: String,

    pub is_completed: bool,

    /// Free-form JSON document, stored as text
    pub extra_data: Option<String>,

    /// RFC 3339 creation time
    pub created_at: String,

    /// RFC 3339 time of last modification
    pub updated_at: String,
}

/// Input data for inserting a new wellness goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWellnessGoal {
    pub user_id: String,
    pub goal_type: String,
    pub title: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub date: String,
    pub is_completed: bool,
    pub extra_data: Option<String>,
}

/// Optional filters for listing a user's goals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalFilter {
    /// Exact day match
    pub date: Option<String>,

    /// Exact goal type match
    pub goal_type: Option<String>,

    /// Inclusive lower bound on the day
    pub date_from: Option<String>,

    /// Inclusive upper bound on the day
    pub date_to: Option<String>,
}

/// Storage model for a single progress log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalLog {
    pub id: String,
    pub goal_id: String,
    pub value: f64,
    pub notes: Option<String>,
    /// RFC 3339 time the progress was logged
    pub logged_at: String,
}

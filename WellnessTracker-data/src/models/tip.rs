use serde::{Deserialize, Serialize};

/// Storage model for a health tip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTip {
    pub id: String,
    pub title: String,
    pub content: String,

    /// Category code (nutrition, exercise, sleep, mental_health, hydration, general)
    pub category: String,

    pub is_active: bool,

    /// Day this tip is pinned to as tip of the day (YYYY-MM-DD)
    pub display_date: Option<String>,

    pub created_at: String,
}

/// Input data for inserting a new health tip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHealthTip {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_active: bool,
    pub display_date: Option<String>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use wellness_tracker_domain::entities::tip::{HealthTip, TipCategory};

/// Public representation of a health tip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TipResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: TipCategory,
    /// Day the tip is pinned to, if any
    pub display_date: Option<NaiveDate>,
    /// Null for the built-in fallback tip
    pub created_at: Option<DateTime<Utc>>,
}

impl From<HealthTip> for TipResponse {
    fn from(tip: HealthTip) -> Self {
        Self {
            id: tip.id,
            title: tip.title,
            content: tip.content,
            category: tip.category,
            display_date: tip.display_date,
            created_at: tip.created_at,
        }
    }
}

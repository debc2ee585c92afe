use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use wellness_tracker_domain::services::{DashboardSummary, DashboardUser};

use crate::entities::goal::GoalResponse;
use crate::entities::reminder::ReminderResponse;
use crate::entities::tip::TipResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardUserResponse {
    pub first_name: String,
    pub last_name: String,
}

impl From<DashboardUser> for DashboardUserResponse {
    fn from(user: DashboardUser) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Patient home screen: today's goals, the next reminders and a tip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub user: DashboardUserResponse,
    pub goals: Vec<GoalResponse>,
    pub reminders: Vec<ReminderResponse>,
    pub health_tip: TipResponse,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            user: summary.user.into(),
            goals: summary.goals.into_iter().map(GoalResponse::from).collect(),
            reminders: summary.reminders.into_iter().map(ReminderResponse::from).collect(),
            health_tip: summary.health_tip.into(),
        }
    }
}

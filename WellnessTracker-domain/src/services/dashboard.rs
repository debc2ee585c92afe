use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::logging::log_access_denied;
use crate::auth::{UserInfo, PATIENT_ROLE};
use crate::entities::goal::{GoalFilter, WellnessGoal};
use crate::entities::reminder::PreventiveCareReminder;
use crate::entities::tip::HealthTip;
use crate::services::goal::{GoalServiceError, GoalServiceTrait};
use crate::services::reminder::{ReminderServiceError, ReminderServiceTrait};
use crate::services::tip::{TipServiceError, TipServiceTrait};

/// Upcoming reminders shown on the dashboard
pub const DASHBOARD_REMINDER_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum DashboardServiceError {
    #[error("{0}")]
    Forbidden(String),

    #[error("Goal error: {0}")]
    Goals(#[from] GoalServiceError),

    #[error("Reminder error: {0}")]
    Reminders(#[from] ReminderServiceError),

    #[error("Tip error: {0}")]
    Tips(#[from] TipServiceError),
}

/// Display names of the dashboard owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub first_name: String,
    pub last_name: String,
}

/// Everything the patient home screen needs in one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub user: DashboardUser,
    pub goals: Vec<WellnessGoal>,
    pub reminders: Vec<PreventiveCareReminder>,
    pub health_tip: HealthTip,
}

#[async_trait]
pub trait DashboardServiceTrait: Send + Sync {
    /// Summary for a patient; other roles are refused
    async fn dashboard_summary(&self, user: &UserInfo, today: NaiveDate) -> Result<DashboardSummary, DashboardServiceError>;
}

/// Dashboard composed from the goal, reminder and tip services
pub struct DashboardService {
    goals: Arc<dyn GoalServiceTrait>,
    reminders: Arc<dyn ReminderServiceTrait>,
    tips: Arc<dyn TipServiceTrait>,
}

impl DashboardService {
    pub fn new(
        goals: Arc<dyn GoalServiceTrait>,
        reminders: Arc<dyn ReminderServiceTrait>,
        tips: Arc<dyn TipServiceTrait>,
    ) -> Self {
        Self { goals, reminders, tips }
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn dashboard_summary(&self, user: &UserInfo, today: NaiveDate) -> Result<DashboardSummary, DashboardServiceError> {
        if !user.has_role(PATIENT_ROLE) {
            log_access_denied(&user.user_id, "dashboard", &[PATIENT_ROLE]);
            return Err(DashboardServiceError::Forbidden("This endpoint is only for patients".to_string()));
        }

        // Today's goals as they are; the dashboard never creates defaults
        let goals = self
            .goals
            .list_goals(&user.user_id, GoalFilter { date: Some(today), goal_type: None })
            .await?;
        let reminders = self
            .reminders
            .upcoming_reminders(&user.user_id, today, DASHBOARD_REMINDER_LIMIT)
            .await?;
        // Newest active tip, not the rotating tip of the day
        let health_tip = self
            .tips
            .list_tips()
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(HealthTip::dashboard_fallback);

        debug!(
            "Dashboard for {}: {} goals, {} reminders",
            user.user_id,
            goals.len(),
            reminders.len()
        );

        Ok(DashboardSummary {
            user: DashboardUser {
                first_name: user.first_name.clone().unwrap_or_default(),
                last_name: user.last_name.clone().unwrap_or_default(),
            },
            goals,
            reminders,
            health_tip,
        })
    }
}

/// Build the dashboard service from already shared services
pub fn create_dashboard_service(
    goals: Arc<dyn GoalServiceTrait>,
    reminders: Arc<dyn ReminderServiceTrait>,
    tips: Arc<dyn TipServiceTrait>,
) -> DashboardService {
    DashboardService::new(goals, reminders, tips)
}

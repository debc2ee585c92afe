// Testing utilities for callers of the domain layer
// This module is only available when the "mock" feature is enabled

use async_trait::async_trait;
use chrono::NaiveDate;

pub use wellness_tracker_data::repository::tests::MockHealthTipRepository;

use crate::entities::goal::{
    CreateGoalRequest, GoalFilter, GoalLog, LogProgressRequest, UpdateGoalRequest, WeeklyProgress, WellnessGoal,
};
use crate::entities::reminder::{
    CompletedReminder, CreateReminderRequest, PreventiveCareReminder, ReminderStatus, UpdateReminderRequest,
};
use crate::services::goal::{GoalServiceError, GoalServiceTrait};
use crate::services::reminder::{ReminderServiceError, ReminderServiceTrait};

const STORAGE_DOWN: &str = "database is unavailable";

/// Goal service whose every call fails as if storage were down
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingGoalService;

fn goal_failure<T>() -> Result<T, GoalServiceError> {
    Err(GoalServiceError::RepositoryError(STORAGE_DOWN.to_string()))
}

#[async_trait]
impl GoalServiceTrait for FailingGoalService {
    async fn list_goals(&self, _user_id: &str, _filter: GoalFilter) -> Result<Vec<WellnessGoal>, GoalServiceError> {
        goal_failure()
    }

    async fn create_goal(&self, _user_id: &str, _request: CreateGoalRequest) -> Result<WellnessGoal, GoalServiceError> {
        goal_failure()
    }

    async fn get_goal(&self, _user_id: &str, _id: &str) -> Result<WellnessGoal, GoalServiceError> {
        goal_failure()
    }

    async fn update_goal(
        &self,
        _user_id: &str,
        _id: &str,
        _request: UpdateGoalRequest,
    ) -> Result<WellnessGoal, GoalServiceError> {
        goal_failure()
    }

    async fn delete_goal(&self, _user_id: &str, _id: &str) -> Result<(), GoalServiceError> {
        goal_failure()
    }

    async fn log_progress(
        &self,
        _user_id: &str,
        _id: &str,
        _request: LogProgressRequest,
    ) -> Result<WellnessGoal, GoalServiceError> {
        goal_failure()
    }

    async fn list_goal_logs(&self, _user_id: &str, _id: &str) -> Result<Vec<GoalLog>, GoalServiceError> {
        goal_failure()
    }

    async fn today_goals(&self, _user_id: &str, _today: NaiveDate) -> Result<Vec<WellnessGoal>, GoalServiceError> {
        goal_failure()
    }

    async fn weekly_progress(&self, _user_id: &str, _today: NaiveDate) -> Result<WeeklyProgress, GoalServiceError> {
        goal_failure()
    }
}

/// Reminder service whose every call fails as if storage were down
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingReminderService;

fn reminder_failure<T>() -> Result<T, ReminderServiceError> {
    Err(ReminderServiceError::RepositoryError(STORAGE_DOWN.to_string()))
}

#[async_trait]
impl ReminderServiceTrait for FailingReminderService {
    async fn list_reminders(
        &self,
        _user_id: &str,
        _status: Option<ReminderStatus>,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError> {
        reminder_failure()
    }

    async fn create_reminder(
        &self,
        _user_id: &str,
        _request: CreateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError> {
        reminder_failure()
    }

    async fn get_reminder(&self, _user_id: &str, _id: &str) -> Result<PreventiveCareReminder, ReminderServiceError> {
        reminder_failure()
    }

    async fn update_reminder(
        &self,
        _user_id: &str,
        _id: &str,
        _request: UpdateReminderRequest,
    ) -> Result<PreventiveCareReminder, ReminderServiceError> {
        reminder_failure()
    }

    async fn delete_reminder(&self, _user_id: &str, _id: &str) -> Result<(), ReminderServiceError> {
        reminder_failure()
    }

    async fn upcoming_reminders(
        &self,
        _user_id: &str,
        _today: NaiveDate,
        _limit: usize,
    ) -> Result<Vec<PreventiveCareReminder>, ReminderServiceError> {
        reminder_failure()
    }

    async fn complete_reminder(&self, _user_id: &str, _id: &str) -> Result<CompletedReminder, ReminderServiceError> {
        reminder_failure()
    }
}

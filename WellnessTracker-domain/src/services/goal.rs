use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::Validate;

use wellness_tracker_data::database::DatabasePool;
use wellness_tracker_data::models as data;
use wellness_tracker_data::repository::{GoalRepositoryTrait, RepositoryError, SqliteGoalRepository};

use crate::entities::conversions;
use crate::entities::goal::{
    round_decimal, CreateGoalRequest, GoalFilter, GoalLog, GoalType, LogProgressRequest, UpdateGoalRequest,
    WeeklyProgress, WellnessGoal,
};
use crate::services::validation::format_validation_errors;

/// Number of days before today covered by the weekly summary
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Goals created for a user who has none on a given day
pub const DEFAULT_DAILY_GOALS: [(GoalType, &str, f64, &str); 3] = [
    (GoalType::Steps, "Daily Steps", 6000.0, "steps"),
    (GoalType::ActiveTime, "Active Time", 60.0, "mins"),
    (GoalType::Sleep, "Sleep", 8.0, "hours"),
];

/// Goal service errors
#[derive(Debug, Error)]
pub enum GoalServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Goal not found: {0}")]
    NotFound(String),

    /// Another goal of the same type already exists for that day
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// A stored row could not be read back
    #[error("Data error: {0}")]
    DataError(String),
}

/// Operations on a user's wellness goals
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    /// Goals owned by the user, newest day first
    async fn list_goals(&self, user_id: &str, filter: GoalFilter) -> Result<Vec<WellnessGoal>, GoalServiceError>;

    async fn create_goal(&self, user_id: &str, request: CreateGoalRequest) -> Result<WellnessGoal, GoalServiceError>;

    async fn get_goal(&self, user_id: &str, id: &str) -> Result<WellnessGoal, GoalServiceError>;

    /// Apply a partial update and re-run the completion rule
    async fn update_goal(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateGoalRequest,
    ) -> Result<WellnessGoal, GoalServiceError>;

    /// Delete a goal along with its logs
    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<(), GoalServiceError>;

    /// Record progress and return the goal with its new total
    async fn log_progress(
        &self,
        user_id: &str,
        id: &str,
        request: LogProgressRequest,
    ) -> Result<WellnessGoal, GoalServiceError>;

    async fn list_goal_logs(&self, user_id: &str, id: &str) -> Result<Vec<GoalLog>, GoalServiceError>;

    /// Goals for `today`, creating the default set first when there are none
    async fn today_goals(&self, user_id: &str, today: NaiveDate) -> Result<Vec<WellnessGoal>, GoalServiceError>;

    /// Completion summary for the seven days up to and including `today`
    async fn weekly_progress(&self, user_id: &str, today: NaiveDate) -> Result<WeeklyProgress, GoalServiceError>;
}

/// Goal service backed by a goal repository
pub struct GoalService<R: GoalRepositoryTrait> {
    repository: R,
}

impl<R: GoalRepositoryTrait> GoalService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn map_repo_error(&self, err: RepositoryError) -> GoalServiceError {
        match err {
            RepositoryError::NotFound(msg) => GoalServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => GoalServiceError::ValidationError(msg),
            RepositoryError::Conflict(_) => GoalServiceError::Conflict(
                "A goal of this type already exists for this date".to_string(),
            ),
            _ => {
                error!("Goal repository failure: {}", err);
                GoalServiceError::RepositoryError(err.to_string())
            }
        }
    }

    fn validate<T: Validate>(&self, request: &T) -> Result<(), GoalServiceError> {
        request.validate().map_err(|errors| {
            let message = format_validation_errors(&errors);
            warn!("Rejected goal input: {}", message);
            GoalServiceError::ValidationError(message)
        })
    }

    fn check_id(&self, id: &str) -> Result<(), GoalServiceError> {
        conversions::parse_string_to_uuid(id)
            .map(|_| ())
            .map_err(GoalServiceError::ValidationError)
    }

    fn to_domain(&self, goal: data::WellnessGoal) -> Result<WellnessGoal, GoalServiceError> {
        conversions::convert_to_domain_goal(goal).map_err(GoalServiceError::DataError)
    }

    fn to_domain_list(&self, goals: Vec<data::WellnessGoal>) -> Result<Vec<WellnessGoal>, GoalServiceError> {
        conversions::convert_to_domain_goals(goals).map_err(GoalServiceError::DataError)
    }
}

#[async_trait]
impl<R: GoalRepositoryTrait> GoalServiceTrait for GoalService<R> {
    async fn list_goals(&self, user_id: &str, filter: GoalFilter) -> Result<Vec<WellnessGoal>, GoalServiceError> {
        debug!("Listing goals for user {} with {:?}", user_id, filter);
        let goals = self
            .repository
            .list(user_id, conversions::convert_to_data_goal_filter(&filter))
            .await
            .map_err(|e| self.map_repo_error(e))?;
        self.to_domain_list(goals)
    }

    async fn create_goal(&self, user_id: &str, request: CreateGoalRequest) -> Result<WellnessGoal, GoalServiceError> {
        self.validate(&request)?;

        let new_goal = conversions::convert_to_data_new_goal(
            user_id,
            request.goal_type,
            &request.title,
            round_decimal(request.target_value),
            &request.unit,
            request.date,
            &request.extra_data,
        );

        let goal = self.repository.create(new_goal).await.map_err(|e| self.map_repo_error(e))?;
        info!("Created {} goal {} for user {}", request.goal_type, goal.id, user_id);
        self.to_domain(goal)
    }

    async fn get_goal(&self, user_id: &str, id: &str) -> Result<WellnessGoal, GoalServiceError> {
        self.check_id(id)?;
        match self.repository.get_by_id(user_id, id).await {
            Ok(Some(goal)) => self.to_domain(goal),
            Ok(None) => Err(GoalServiceError::NotFound(format!("Goal with ID {} not found", id))),
            Err(e) => Err(self.map_repo_error(e)),
        }
    }

    async fn update_goal(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateGoalRequest,
    ) -> Result<WellnessGoal, GoalServiceError> {
        self.validate(&request)?;
        let mut goal = self.get_goal(user_id, id).await?;

        if let Some(goal_type) = request.goal_type {
            goal.goal_type = goal_type;
        }
        if let Some(title) = request.title {
            goal.title = title;
        }
        if let Some(target_value) = request.target_value {
            goal.target_value = round_decimal(target_value);
        }
        if let Some(current_value) = request.current_value {
            goal.current_value = round_decimal(current_value);
        }
        if let Some(unit) = request.unit {
            goal.unit = unit;
        }
        if let Some(date) = request.date {
            goal.date = date;
        }
        if let Some(extra_data) = request.extra_data {
            goal.extra_data = extra_data;
        }
        goal.apply_completion_rule();

        let updated = self
            .repository
            .update(conversions::convert_to_data_goal(&goal))
            .await
            .map_err(|e| self.map_repo_error(e))?;
        info!("Updated goal {} for user {}", id, user_id);
        self.to_domain(updated)
    }

    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<(), GoalServiceError> {
        self.check_id(id)?;
        let deleted = self.repository.delete(user_id, id).await.map_err(|e| self.map_repo_error(e))?;
        if deleted {
            Ok(())
        } else {
            Err(GoalServiceError::NotFound(format!("Goal with ID {} not found", id)))
        }
    }

    async fn log_progress(
        &self,
        user_id: &str,
        id: &str,
        request: LogProgressRequest,
    ) -> Result<WellnessGoal, GoalServiceError> {
        self.check_id(id)?;
        self.validate(&request)?;

        let value = round_decimal(request.value);
        let updated = self
            .repository
            .log_progress(user_id, id, value, request.notes)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| GoalServiceError::NotFound(format!("Goal with ID {} not found", id)))?;

        let goal = self.to_domain(updated)?;
        info!(
            "Logged {} on goal {} for user {} (total {}, completed {})",
            value, id, user_id, goal.current_value, goal.is_completed
        );
        Ok(goal)
    }

    async fn list_goal_logs(&self, user_id: &str, id: &str) -> Result<Vec<GoalLog>, GoalServiceError> {
        // Resolve the goal first so a foreign or missing goal is a 404, not an empty list
        self.get_goal(user_id, id).await?;

        let logs = self.repository.list_logs(user_id, id).await.map_err(|e| self.map_repo_error(e))?;
        logs.into_iter()
            .map(|log| conversions::convert_to_domain_goal_log(log).map_err(GoalServiceError::DataError))
            .collect()
    }

    async fn today_goals(&self, user_id: &str, today: NaiveDate) -> Result<Vec<WellnessGoal>, GoalServiceError> {
        let filter = GoalFilter { date: Some(today), goal_type: None };
        let goals = self.list_goals(user_id, filter.clone()).await?;
        if !goals.is_empty() {
            return Ok(goals);
        }

        let defaults = DEFAULT_DAILY_GOALS
            .iter()
            .map(|(goal_type, title, target, unit)| {
                conversions::convert_to_data_new_goal(user_id, *goal_type, title, *target, unit, today, &None)
            })
            .collect();

        let created = self
            .repository
            .create_if_absent(defaults)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        if created > 0 {
            info!("Created {} default goals for user {} on {}", created, user_id, today);
        }

        self.list_goals(user_id, filter).await
    }

    async fn weekly_progress(&self, user_id: &str, today: NaiveDate) -> Result<WeeklyProgress, GoalServiceError> {
        let start_date = today - Duration::days(WEEKLY_WINDOW_DAYS);
        let filter = data::GoalFilter {
            date_from: Some(conversions::format_date(start_date)),
            date_to: Some(conversions::format_date(today)),
            ..Default::default()
        };

        let goals = self.repository.list(user_id, filter).await.map_err(|e| self.map_repo_error(e))?;
        let goals = self.to_domain_list(goals)?;
        Ok(WeeklyProgress::from_goals(start_date, today, goals))
    }
}

/// Create a goal service on top of the SQLite repository
pub fn create_goal_service(pool: DatabasePool) -> GoalService<SqliteGoalRepository> {
    GoalService::new(SqliteGoalRepository::new(pool))
}

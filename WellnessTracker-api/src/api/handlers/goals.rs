use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{error, info, instrument, warn};

use wellness_tracker_domain::auth::UserInfo;
use wellness_tracker_domain::entities::WellnessGoal;
use wellness_tracker_domain::services::{GoalServiceError, GoalServiceTrait};

use crate::api::handlers::{today, validated_body};
use crate::entities::common::ErrorResponse;
use crate::entities::goal::{
    CreateGoalRequest, GoalLogResponse, GoalQueryParams, GoalResponse, LogProgressRequest, UpdateGoalRequest,
    WeeklyProgressResponse,
};

/// Service type for dependency injection
pub type GoalService = Arc<dyn GoalServiceTrait>;

impl From<GoalServiceError> for ErrorResponse {
    fn from(err: GoalServiceError) -> Self {
        match err {
            GoalServiceError::ValidationError(message) => {
                warn!("Invalid goal request: {}", message);
                ErrorResponse::validation_error(&message, None)
            }
            GoalServiceError::NotFound(id) => {
                info!("Goal not found: {}", id);
                ErrorResponse::not_found("goal")
            }
            GoalServiceError::Conflict(message) => {
                warn!("Goal conflict: {}", message);
                ErrorResponse::conflict(&message)
            }
            other => {
                error!("Goal service failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

fn goal_responses(goals: Vec<WellnessGoal>) -> Vec<GoalResponse> {
    goals.into_iter().map(GoalResponse::from).collect()
}

/// List the caller's goals
#[utoipa::path(
    get,
    path = "/api/v1/goals",
    params(GoalQueryParams),
    responses(
        (status = 200, description = "Goals owned by the caller", body = [GoalResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_goals(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Query(params): Query<GoalQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let filter = params.to_filter().map_err(|message| ErrorResponse::bad_request(&message))?;
    let goals = service.list_goals(&user.user_id, filter).await?;
    Ok(Json(goal_responses(goals)))
}

/// Create a goal for the caller
#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "A goal of this type already exists for the date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn create_goal(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    body: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = validated_body(body)?;
    let goal = service.create_goal(&user.user_id, request).await?;
    info!("Goal created with ID: {}", goal.id);
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

/// Today's goals, created from the defaults when the day has none.
///
/// Storage failures yield an empty list rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1/goals/today",
    responses(
        (status = 200, description = "Goals for the current day", body = [GoalResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_today_goals(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
) -> Json<Vec<GoalResponse>> {
    match service.today_goals(&user.user_id, today()).await {
        Ok(goals) => Json(goal_responses(goals)),
        Err(e) => {
            error!("Failed to load today's goals, returning none: {}", e);
            Json(Vec::new())
        }
    }
}

/// Completion statistics for the last seven days
#[utoipa::path(
    get,
    path = "/api/v1/goals/weekly",
    responses(
        (status = 200, description = "Weekly progress", body = WeeklyProgressResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_weekly_progress(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let progress = service.weekly_progress(&user.user_id, today()).await?;
    Ok(Json(WeeklyProgressResponse::from(progress)))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Goal found", body = GoalResponse),
        (status = 400, description = "Malformed goal ID", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_goal(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let goal = service.get_goal(&user.user_id, &id).await?;
    Ok(Json(GoalResponse::from(goal)))
}

/// Partially update a goal. Served for both PATCH and PUT.
#[utoipa::path(
    patch,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 409, description = "Update collides with another goal", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn update_goal(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    body: Result<Json<UpdateGoalRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = validated_body(body)?;
    let goal = service.update_goal(&user.user_id, &id, request).await?;
    info!("Goal {} updated", goal.id);
    Ok(Json(GoalResponse::from(goal)))
}

/// Delete a goal and its progress log
#[utoipa::path(
    delete,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal ID")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_goal(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete_goal(&user.user_id, &id).await?;
    info!("Goal {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Add progress to a goal and return its new state
#[utoipa::path(
    post,
    path = "/api/v1/goals/{id}/log",
    params(("id" = String, Path, description = "Goal ID")),
    request_body = LogProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = GoalResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn log_progress(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    body: Result<Json<LogProgressRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = validated_body(body)?;
    let goal = service.log_progress(&user.user_id, &id, request).await?;
    info!("Logged progress on goal {}, total now {}", goal.id, goal.current_value);
    Ok(Json(GoalResponse::from(goal)))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{id}/logs",
    params(("id" = String, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Progress entries of the goal", body = [GoalLogResponse]),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "goals"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_goal_logs(
    State(service): State<GoalService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let logs = service.list_goal_logs(&user.user_id, &id).await?;
    let logs: Vec<GoalLogResponse> = logs.into_iter().map(GoalLogResponse::from).collect();
    Ok(Json(logs))
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{error, info, instrument, warn};

use wellness_tracker_domain::auth::UserInfo;
use wellness_tracker_domain::services::reminder::UPCOMING_LIMIT;
use wellness_tracker_domain::services::{ReminderServiceError, ReminderServiceTrait};

use crate::api::handlers::{today, validated_body};
use crate::entities::common::ErrorResponse;
use crate::entities::reminder::{
    CompleteReminderResponse, CreateReminderRequest, ReminderQueryParams, ReminderResponse, UpdateReminderRequest,
};

/// Service type for dependency injection
pub type ReminderService = Arc<dyn ReminderServiceTrait>;

impl From<ReminderServiceError> for ErrorResponse {
    fn from(err: ReminderServiceError) -> Self {
        match err {
            ReminderServiceError::ValidationError(message) => {
                warn!("Invalid reminder request: {}", message);
                ErrorResponse::validation_error(&message, None)
            }
            ReminderServiceError::NotFound(id) => {
                info!("Reminder not found: {}", id);
                ErrorResponse::not_found("reminder")
            }
            other => {
                error!("Reminder service failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

/// List the caller's reminders
#[utoipa::path(
    get,
    path = "/api/v1/reminders",
    params(ReminderQueryParams),
    responses(
        (status = 200, description = "Reminders owned by the caller", body = [ReminderResponse]),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn list_reminders(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    Query(params): Query<ReminderQueryParams>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let status = params.to_status().map_err(|message| ErrorResponse::bad_request(&message))?;
    let reminders = service.list_reminders(&user.user_id, status).await?;
    let reminders: Vec<ReminderResponse> = reminders.into_iter().map(ReminderResponse::from).collect();
    Ok(Json(reminders))
}

#[utoipa::path(
    post,
    path = "/api/v1/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = ReminderResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn create_reminder(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    body: Result<Json<CreateReminderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = validated_body(body)?;
    let reminder = service.create_reminder(&user.user_id, request).await?;
    info!("Reminder created with ID: {}", reminder.id);
    Ok((StatusCode::CREATED, Json(ReminderResponse::from(reminder))))
}

/// The next upcoming reminders. Storage failures yield an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/reminders/upcoming",
    responses(
        (status = 200, description = "Up to five upcoming reminders, soonest first", body = [ReminderResponse]),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_upcoming_reminders(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
) -> Json<Vec<ReminderResponse>> {
    match service.upcoming_reminders(&user.user_id, today(), UPCOMING_LIMIT).await {
        Ok(reminders) => Json(reminders.into_iter().map(ReminderResponse::from).collect()),
        Err(e) => {
            error!("Failed to load upcoming reminders, returning none: {}", e);
            Json(Vec::new())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/reminders/{id}",
    params(("id" = String, Path, description = "Reminder ID")),
    responses(
        (status = 200, description = "Reminder found", body = ReminderResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_reminder(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let reminder = service.get_reminder(&user.user_id, &id).await?;
    Ok(Json(ReminderResponse::from(reminder)))
}

/// Partially update a reminder. Served for both PATCH and PUT.
#[utoipa::path(
    patch,
    path = "/api/v1/reminders/{id}",
    params(("id" = String, Path, description = "Reminder ID")),
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Reminder updated", body = ReminderResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user, body), fields(user_id = %user.user_id))]
pub async fn update_reminder(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    body: Result<Json<UpdateReminderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let request = validated_body(body)?;
    let reminder = service.update_reminder(&user.user_id, &id, request).await?;
    info!("Reminder {} updated", reminder.id);
    Ok(Json(ReminderResponse::from(reminder)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reminders/{id}",
    params(("id" = String, Path, description = "Reminder ID")),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn delete_reminder(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete_reminder(&user.user_id, &id).await?;
    info!("Reminder {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a reminder completed; recurring reminders get their next occurrence scheduled
#[utoipa::path(
    post,
    path = "/api/v1/reminders/{id}/complete",
    params(("id" = String, Path, description = "Reminder ID")),
    responses(
        (status = 200, description = "Reminder completed", body = CompleteReminderResponse),
        (status = 400, description = "Reminder already completed", body = ErrorResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn complete_reminder(
    State(service): State<ReminderService>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let result = service.complete_reminder(&user.user_id, &id).await?;
    Ok(Json(CompleteReminderResponse::from(result)))
}

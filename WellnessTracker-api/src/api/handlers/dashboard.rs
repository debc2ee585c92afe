use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use tracing::{error, instrument};

use wellness_tracker_domain::auth::UserInfo;
use wellness_tracker_domain::services::{DashboardServiceError, DashboardServiceTrait};

use crate::api::handlers::today;
use crate::entities::common::ErrorResponse;
use crate::entities::dashboard::DashboardResponse;

pub type DashboardService = Arc<dyn DashboardServiceTrait>;

/// Patient dashboard summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard for the calling patient", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a patient", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
#[instrument(skip(service, user), fields(user_id = %user.user_id))]
pub async fn get_dashboard(
    State(service): State<DashboardService>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, ErrorResponse> {
    match service.dashboard_summary(&user, today()).await {
        Ok(summary) => Ok(Json(DashboardResponse::from(summary))),
        Err(DashboardServiceError::Forbidden(message)) => Err(ErrorResponse::forbidden(&message)),
        Err(e) => {
            error!("Error building dashboard: {}", e);
            Err(ErrorResponse::internal_error())
        }
    }
}

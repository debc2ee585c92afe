use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{debug, error, instrument};

use wellness_tracker_domain::services::TipServiceTrait;

use crate::api::handlers::today;
use crate::entities::common::ErrorResponse;
use crate::entities::tip::TipResponse;

pub type TipService = Arc<dyn TipServiceTrait>;

/// Tip of the day. Public; always answers, falling back to a built-in tip.
#[utoipa::path(
    get,
    path = "/api/v1/tips/today",
    responses(
        (status = 200, description = "Tip for the current day", body = TipResponse),
    ),
    tag = "tips"
)]
#[instrument(skip(service))]
pub async fn get_tip_of_day(State(service): State<TipService>) -> Json<TipResponse> {
    let tip = service.tip_of_day(today()).await;
    debug!("Serving tip {}", tip.title);
    Json(TipResponse::from(tip))
}

/// All active tips. Public.
#[utoipa::path(
    get,
    path = "/api/v1/tips",
    responses(
        (status = 200, description = "Active health tips", body = [TipResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "tips"
)]
#[instrument(skip(service))]
pub async fn list_tips(State(service): State<TipService>) -> Result<impl IntoResponse, ErrorResponse> {
    match service.list_tips().await {
        Ok(tips) => Ok(Json(tips.into_iter().map(TipResponse::from).collect::<Vec<_>>())),
        Err(e) => {
            error!("Error listing health tips: {}", e);
            Err(ErrorResponse::internal_error())
        }
    }
}

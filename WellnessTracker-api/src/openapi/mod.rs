use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer JWT scheme referenced by protected paths
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Goal endpoints
        crate::api::handlers::goals::list_goals,
        crate::api::handlers::goals::create_goal,
        crate::api::handlers::goals::get_today_goals,
        crate::api::handlers::goals::get_weekly_progress,
        crate::api::handlers::goals::get_goal,
        crate::api::handlers::goals::update_goal,
        crate::api::handlers::goals::delete_goal,
        crate::api::handlers::goals::log_progress,
        crate::api::handlers::goals::get_goal_logs,

        // Reminder endpoints
        crate::api::handlers::reminders::list_reminders,
        crate::api::handlers::reminders::create_reminder,
        crate::api::handlers::reminders::get_upcoming_reminders,
        crate::api::handlers::reminders::get_reminder,
        crate::api::handlers::reminders::update_reminder,
        crate::api::handlers::reminders::delete_reminder,
        crate::api::handlers::reminders::complete_reminder,

        // Tips and dashboard
        crate::api::handlers::tips::get_tip_of_day,
        crate::api::handlers::tips::list_tips,
        crate::api::handlers::dashboard::get_dashboard
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,

            // Goals
            crate::entities::goal::GoalResponse,
            crate::entities::goal::CreateGoalRequest,
            crate::entities::goal::UpdateGoalRequest,
            crate::entities::goal::LogProgressRequest,
            crate::entities::goal::GoalLogResponse,
            crate::entities::goal::WeeklyProgressResponse,
            crate::entities::goal::StepsSummaryResponse,
            wellness_tracker_domain::entities::GoalType,

            // Reminders
            crate::entities::reminder::ReminderResponse,
            crate::entities::reminder::CreateReminderRequest,
            crate::entities::reminder::UpdateReminderRequest,
            crate::entities::reminder::CompleteReminderResponse,
            wellness_tracker_domain::entities::ReminderType,
            wellness_tracker_domain::entities::ReminderStatus,

            // Tips and dashboard
            crate::entities::tip::TipResponse,
            wellness_tracker_domain::entities::TipCategory,
            crate::entities::dashboard::DashboardResponse,
            crate::entities::dashboard::DashboardUserResponse,

            // Health
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "goals", description = "Daily wellness goals and progress logging"),
        (name = "reminders", description = "Preventive care reminders"),
        (name = "tips", description = "Health tips"),
        (name = "dashboard", description = "Patient dashboard")
    ),
    info(
        title = "WellnessTracker API",
        version = "0.1.0",
        description = "API for tracking wellness goals, preventive care reminders and health tips",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "WellnessTracker API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        for name in ["health", "goals", "reminders", "tips", "dashboard"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {}", name);
        }

        for path in [
            "/health",
            "/api/v1/goals",
            "/api/v1/goals/today",
            "/api/v1/goals/weekly",
            "/api/v1/goals/{id}",
            "/api/v1/goals/{id}/log",
            "/api/v1/goals/{id}/logs",
            "/api/v1/reminders",
            "/api/v1/reminders/upcoming",
            "/api/v1/reminders/{id}",
            "/api/v1/reminders/{id}/complete",
            "/api/v1/tips/today",
            "/api/v1/tips",
            "/api/v1/dashboard",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}

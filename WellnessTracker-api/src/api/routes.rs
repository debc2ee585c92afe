use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use wellness_tracker_domain::auth::{auth_middleware, configure_security, AuthConfig};
use wellness_tracker_domain::database::DatabasePool;
use wellness_tracker_domain::health::DatabaseHealthService;
use wellness_tracker_domain::services::{
    create_dashboard_service, create_goal_service, create_reminder_service, create_tip_service,
};

use crate::api::handlers::dashboard::DashboardService;
use crate::api::handlers::goals::GoalService;
use crate::api::handlers::health::{self, Environment, HealthService};
use crate::api::handlers::reminders::ReminderService;
use crate::api::handlers::tips::TipService;
use crate::api::handlers::{dashboard, goals, reminders, tips};
use crate::openapi::configure_swagger_routes;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub goals: GoalService,
    pub reminders: ReminderService,
    pub tips: TipService,
    pub dashboard: DashboardService,
    #[from_ref(skip)]
    pub health: HealthService,
    pub auth: AuthConfig,
    #[from_ref(skip)]
    pub environment: String,
}

impl AppState {
    /// Wire the SQLite backed services on top of one pool
    pub fn from_pool(pool: DatabasePool, auth: AuthConfig, environment: impl Into<String>) -> Self {
        let goals: GoalService = Arc::new(create_goal_service(pool.clone()));
        let reminders: ReminderService = Arc::new(create_reminder_service(pool.clone()));
        let tips: TipService = Arc::new(create_tip_service(pool.clone()));
        let dashboard: DashboardService =
            Arc::new(create_dashboard_service(goals.clone(), reminders.clone(), tips.clone()));

        Self {
            goals,
            reminders,
            tips,
            dashboard,
            health: Arc::new(DatabaseHealthService::new(pool)),
            auth,
            environment: environment.into(),
        }
    }
}

/// Create the application router
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    debug!("Creating application router");

    // Routes that require a bearer token. Static segments are declared
    // before the `:id` routes they share a prefix with.
    let protected_routes = Router::new()
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route("/goals/today", get(goals::get_today_goals))
        .route("/goals/weekly", get(goals::get_weekly_progress))
        .route(
            "/goals/:id",
            get(goals::get_goal)
                .patch(goals::update_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route("/goals/:id/log", post(goals::log_progress))
        .route("/goals/:id/logs", get(goals::get_goal_logs))
        .route("/reminders", get(reminders::list_reminders).post(reminders::create_reminder))
        .route("/reminders/upcoming", get(reminders::get_upcoming_reminders))
        .route(
            "/reminders/:id",
            get(reminders::get_reminder)
                .patch(reminders::update_reminder)
                .put(reminders::update_reminder)
                .delete(reminders::delete_reminder),
        )
        .route("/reminders/:id/complete", post(reminders::complete_reminder))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state.auth.clone(), auth_middleware));

    debug!("Protected API routes configured");

    let public_api_routes = Router::new()
        .route("/tips/today", get(tips::get_tip_of_day))
        .route("/tips", get(tips::list_tips));

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(state.health.clone()))
        .layer(Extension(Environment(state.environment.clone())));

    let app = Router::new()
        .merge(health_routes)
        .nest("/api/v1", protected_routes.merge(public_api_routes))
        .with_state(state);

    debug!("API routes nested");

    let app = add_swagger_ui(app);
    let app = configure_security(app, allowed_origins);
    debug!("Security configuration applied");

    health::initialize_server_start_time();

    app.layer(TraceLayer::new_for_http())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}

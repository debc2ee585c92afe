use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use wellness_tracker_api::{create_app, AppState};
use wellness_tracker_data::models::NewHealthTip;
use wellness_tracker_data::repository::{HealthTipRepositoryTrait, SqliteHealthTipRepository};
use wellness_tracker_domain::auth::token::{generate_token, TokenProfile};
use wellness_tracker_domain::auth::{AuthConfig, PATIENT_ROLE};
use wellness_tracker_domain::database::{in_memory_pool, DatabasePool};
use wellness_tracker_domain::services::{create_dashboard_service, create_tip_service, TipServiceTrait};
use wellness_tracker_domain::testing::{FailingGoalService, FailingReminderService};

const SECRET: &str = "api-test-secret";

struct TestApp {
    router: Router,
    auth: AuthConfig,
}

impl TestApp {
    fn from_state(state: AppState) -> Self {
        let auth = state.auth.clone();
        Self {
            router: create_app(state, &["*".to_string()]),
            auth,
        }
    }

    fn with_pool(pool: DatabasePool) -> Self {
        Self::from_state(AppState::from_pool(pool, auth_config(), "test"))
    }

    fn new() -> Self {
        Self::with_pool(in_memory_pool().unwrap())
    }

    fn token(&self, user_id: &str, roles: &[&str]) -> String {
        let profile = TokenProfile {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            given_name: Some("Pat".to_string()),
            family_name: Some("Jones".to_string()),
        };
        generate_token(&self.auth, user_id, profile, Duration::minutes(10)).unwrap()
    }

    fn patient(&self, user_id: &str) -> String {
        self.token(user_id, &[PATIENT_ROLE])
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }
}

fn auth_config() -> AuthConfig {
    AuthConfig::new(SECRET, "wellness-tracker")
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn water_goal(date: NaiveDate) -> Value {
    json!({
        "goal_type": "water",
        "title": "Drink water",
        "target_value": 8,
        "unit": "glasses",
        "date": date.to_string(),
    })
}

fn checkup(date: NaiveDate) -> Value {
    json!({
        "reminder_type": "checkup",
        "title": "Annual physical",
        "scheduled_date": date.to_string(),
        "scheduled_time": "09:30",
        "location": "Clinic",
    })
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/goals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.get("/api/v1/goals", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = AuthConfig::new("some-other-secret", "wellness-tracker");
    let token = generate_token(&foreign, "mallory", TokenProfile::default(), Duration::minutes(5)).unwrap();
    let (status, _) = app.get("/api/v1/goals", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_goal_crud() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    let (status, created) = app.post("/api/v1/goals", &token, water_goal(date)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["current_value"], 0.0);
    assert_eq!(created["progress_percentage"], 0);
    assert_eq!(created["is_completed"], false);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.get(&format!("/api/v1/goals/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Drink water");

    let (status, listed) = app.get("/api/v1/goals?type=water&date=2024-05-20", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = app.get("/api/v1/goals?type=sleep", &token).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, updated) = app
        .send(Method::PATCH, &format!("/api/v1/goals/{}", id), Some(&token), Some(json!({"title": "Hydrate"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Hydrate");
    assert_eq!(updated["target_value"], 8.0);

    let (status, updated) = app
        .send(Method::PUT, &format!("/api/v1/goals/{}", id), Some(&token), Some(json!({"current_value": 8})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_completed"], true);

    let (status, body) = app.send(Method::DELETE, &format!("/api/v1/goals/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.get(&format!("/api/v1/goals/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_goals_are_private() {
    let app = TestApp::new();
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let (_, created) = app.post("/api/v1/goals", &app.patient("alice"), water_goal(date)).await;
    let id = created["id"].as_str().unwrap();

    let bob = app.patient("bob");
    let (status, _) = app.get(&format!("/api/v1/goals/{}", id), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post(&format!("/api/v1/goals/{}/log", id), &bob, json!({"value": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/api/v1/goals", &bob).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_goal_conflicts() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    let (status, _) = app.post("/api/v1/goals", &token, water_goal(date)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/v1/goals", &token, water_goal(date)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Same type on another day is fine
    let (status, _) = app.post("/api/v1/goals", &token, water_goal(date.succ_opt().unwrap())).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_goal_requests() {
    let app = TestApp::new();
    let token = app.patient("alice");

    let mut request = water_goal(today());
    request["title"] = json!("");
    let (status, body) = app.post("/api/v1/goals", &token, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]["title"].is_array());

    let mut request = water_goal(today());
    request["goal_type"] = json!("yoga");
    let (status, body) = app.post("/api/v1/goals", &token, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = app.get("/api/v1/goals?date=20-05-2024", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/goals/not-a-uuid", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.get(&format!("/api/v1/goals/{}", missing), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_log_progress_completes_goal() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let (_, created) = app.post("/api/v1/goals", &token, water_goal(today())).await;
    let id = created["id"].as_str().unwrap();
    let log_uri = format!("/api/v1/goals/{}/log", id);

    let (status, goal) = app.post(&log_uri, &token, json!({"value": 5, "notes": "morning"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["current_value"], 5.0);
    assert_eq!(goal["progress_percentage"], 62);
    assert_eq!(goal["is_completed"], false);

    let (_, goal) = app.post(&log_uri, &token, json!({"value": 4})).await;
    assert_eq!(goal["current_value"], 9.0);
    assert_eq!(goal["progress_percentage"], 100);
    assert_eq!(goal["is_completed"], true);

    let (status, logs) = app.get(&format!("/api/v1/goals/{}/logs", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|log| log["notes"] == "morning"));

    let (status, _) = app.post(&log_uri, &token, json!({"notes": "no value"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_progress_total_must_stay_in_range() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let (_, created) = app.post("/api/v1/goals", &token, water_goal(today())).await;
    let log_uri = format!("/api/v1/goals/{}/log", created["id"].as_str().unwrap());

    let (status, goal) = app.post(&log_uri, &token, json!({"value": 99999999.0})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["current_value"], 99999999.0);

    let (status, body) = app.post(&log_uri, &token, json!({"value": 99999999.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, goal) = app.get(&format!("/api/v1/goals/{}", created["id"].as_str().unwrap()), &token).await;
    assert_eq!(goal["current_value"], 99999999.0);
}

#[tokio::test]
async fn test_patch_null_clears_nullable_fields() {
    let app = TestApp::new();
    let token = app.patient("alice");

    let mut goal = water_goal(today());
    goal["extra_data"] = json!({"source": "watch"});
    let (_, created) = app.post("/api/v1/goals", &token, goal).await;
    assert_eq!(created["extra_data"]["source"], "watch");
    let goal_uri = format!("/api/v1/goals/{}", created["id"].as_str().unwrap());

    let (_, kept) = app.send(Method::PATCH, &goal_uri, Some(&token), Some(json!({"title": "Hydrate"}))).await;
    assert_eq!(kept["extra_data"]["source"], "watch");

    let (status, cleared) = app.send(Method::PATCH, &goal_uri, Some(&token), Some(json!({"extra_data": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.as_object().unwrap().contains_key("extra_data"));
    assert!(cleared["extra_data"].is_null());

    let mut reminder = checkup(today() + Duration::days(10));
    reminder["is_recurring"] = json!(true);
    reminder["recurrence_interval"] = json!(90);
    let (_, created) = app.post("/api/v1/reminders", &token, reminder).await;
    let reminder_uri = format!("/api/v1/reminders/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .send(Method::PATCH, &reminder_uri, Some(&token), Some(json!({"recurrence_interval": null})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, cleared) = app
        .send(
            Method::PATCH,
            &reminder_uri,
            Some(&token),
            Some(json!({"is_recurring": false, "recurrence_interval": null, "scheduled_time": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["is_recurring"], false);
    assert!(cleared["recurrence_interval"].is_null());
    assert!(cleared["scheduled_time"].is_null());
}

#[tokio::test]
async fn test_today_seeds_defaults_once() {
    let app = TestApp::new();
    let token = app.patient("alice");

    let (status, first) = app.get("/api/v1/goals/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    let first = first.as_array().unwrap().clone();
    assert_eq!(first.len(), 3);
    let mut types: Vec<&str> = first.iter().map(|g| g["goal_type"].as_str().unwrap()).collect();
    types.sort_unstable();
    assert_eq!(types, vec!["active_time", "sleep", "steps"]);

    let (_, second) = app.get("/api/v1/goals/today", &token).await;
    assert_eq!(second.as_array().unwrap().len(), 3);

    let (_, all) = app.get("/api/v1/goals", &token).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_weekly_progress() {
    let app = TestApp::new();
    let token = app.patient("alice");

    let steps = json!({
        "goal_type": "steps",
        "title": "Walk",
        "target_value": 1000,
        "unit": "steps",
        "date": today().to_string(),
    });
    let (_, goal) = app.post("/api/v1/goals", &token, steps).await;
    app.post(&format!("/api/v1/goals/{}/log", goal["id"].as_str().unwrap()), &token, json!({"value": 1200}))
        .await;
    app.post("/api/v1/goals", &token, water_goal(today() - Duration::days(7))).await;
    // Outside the window
    app.post("/api/v1/goals", &token, water_goal(today() - Duration::days(8))).await;

    let (status, weekly) = app.get("/api/v1/goals/weekly", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weekly["total_goals"], 2);
    assert_eq!(weekly["completed_goals"], 1);
    assert_eq!(weekly["completion_rate"], 50.0);
    assert_eq!(weekly["steps_summary"]["total"], 1200.0);
    assert_eq!(weekly["steps_summary"]["target"], 1000.0);
    assert_eq!(weekly["end_date"], today().to_string());
    assert_eq!(weekly["start_date"], (today() - Duration::days(7)).to_string());
}

#[tokio::test]
async fn test_reminder_lifecycle() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let date = today() + Duration::days(10);

    let (status, created) = app.post("/api/v1/reminders", &token, checkup(date)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "upcoming");
    assert_eq!(created["scheduled_time"], "09:30:00");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/reminders/{}", id),
            Some(&token),
            Some(json!({"location": "Main street clinic"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location"], "Main street clinic");
    assert_eq!(updated["title"], "Annual physical");

    let (_, listed) = app.get("/api/v1/reminders?status=upcoming", &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = app.get("/api/v1/reminders?status=missed", &token).await;
    assert!(listed.as_array().unwrap().is_empty());
    let (status, _) = app.get("/api/v1/reminders?status=late", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::DELETE, &format!("/api/v1/reminders/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/v1/reminders/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recurring_reminder_validation_and_completion() {
    let app = TestApp::new();
    let token = app.patient("alice");
    let date = today() + Duration::days(3);

    let mut request = checkup(date);
    request["is_recurring"] = json!(true);
    let (status, _) = app.post("/api/v1/reminders", &token, request.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    request["recurrence_interval"] = json!(0);
    let (status, _) = app.post("/api/v1/reminders", &token, request.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    request["recurrence_interval"] = json!(30);
    let (status, created) = app.post("/api/v1/reminders", &token, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let complete_uri = format!("/api/v1/reminders/{}/complete", id);
    let (status, result) = app.post(&complete_uri, &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["completed"]["status"], "completed");
    assert_eq!(result["next"]["status"], "upcoming");
    assert_eq!(result["next"]["scheduled_date"], (date + Duration::days(30)).to_string());

    let (status, _) = app.post(&complete_uri, &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upcoming_reminders_are_limited_and_ordered() {
    let app = TestApp::new();
    let token = app.patient("alice");

    for offset in [6, 2, 4, 1, 5, 3, 7] {
        let mut request = checkup(today() + Duration::days(offset));
        request["title"] = json!(format!("Visit in {} days", offset));
        app.post("/api/v1/reminders", &token, request).await;
    }
    app.post("/api/v1/reminders", &token, checkup(today() - Duration::days(1))).await;

    let (status, upcoming) = app.get("/api/v1/reminders/upcoming", &token).await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = upcoming.as_array().unwrap();
    assert_eq!(upcoming.len(), 5);
    assert_eq!(upcoming[0]["title"], "Visit in 1 days");
    assert_eq!(upcoming[4]["title"], "Visit in 5 days");
}

#[tokio::test]
async fn test_tips_are_public() {
    let app = TestApp::new();

    let (status, tip) = app.send(Method::GET, "/api/v1/tips/today", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tip["title"], "Stay Hydrated");
    assert_eq!(tip["category"], "hydration");

    let (status, tips) = app.send(Method::GET, "/api/v1/tips", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(tips.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_seeded_tips_are_served() {
    let pool = in_memory_pool().unwrap();
    create_tip_service(pool.clone()).seed_default_tips().await.unwrap();
    let app = TestApp::with_pool(pool);

    let (_, tips) = app.send(Method::GET, "/api/v1/tips", None, None).await;
    let titles: Vec<&str> = tips.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles.len(), 5);

    let (_, tip) = app.send(Method::GET, "/api/v1/tips/today", None, None).await;
    assert!(titles.contains(&tip["title"].as_str().unwrap()));
    assert!(tip["created_at"].is_string());
}

#[tokio::test]
async fn test_dashboard_tip_is_newest_active_tip() {
    let pool = in_memory_pool().unwrap();
    let repository = SqliteHealthTipRepository::new(pool.clone());
    for (title, display_date) in [("Undated", None), ("Earlier", Some("2024-01-01")), ("Latest", Some("2024-02-01"))] {
        repository
            .create(NewHealthTip {
                title: title.to_string(),
                content: format!("{} content", title),
                category: "general".to_string(),
                is_active: true,
                display_date: display_date.map(str::to_string),
            })
            .await
            .unwrap();
    }
    let app = TestApp::with_pool(pool);
    let token = app.patient("alice");

    for _ in 0..3 {
        let (status, body) = app.get("/api/v1/dashboard", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health_tip"]["title"], "Latest");
    }
}

#[tokio::test]
async fn test_dashboard() {
    let app = TestApp::new();

    let doctor = app.token("dr-who", &["doctor"]);
    let (status, body) = app.get("/api/v1/dashboard", &doctor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], "This endpoint is only for patients");

    let token = app.patient("alice");
    let (status, body) = app.get("/api/v1/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Pat");
    assert_eq!(body["user"]["last_name"], "Jones");
    assert!(body["goals"].as_array().unwrap().is_empty());
    assert_eq!(body["health_tip"]["title"], "Stay Hydrated");
    assert_eq!(body["health_tip"]["content"], "Aim to drink at least 8 glasses of water per day.");

    app.post("/api/v1/goals", &token, water_goal(today())).await;
    for offset in 1..=4 {
        app.post("/api/v1/reminders", &token, checkup(today() + Duration::days(offset))).await;
    }

    let (_, body) = app.get("/api/v1/dashboard", &token).await;
    assert_eq!(body["goals"].as_array().unwrap().len(), 1);
    assert_eq!(body["reminders"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_degraded_endpoints_on_storage_failure() {
    let mut state = AppState::from_pool(in_memory_pool().unwrap(), auth_config(), "test");
    state.goals = Arc::new(FailingGoalService);
    state.reminders = Arc::new(FailingReminderService);
    state.dashboard = Arc::new(create_dashboard_service(
        state.goals.clone(),
        state.reminders.clone(),
        state.tips.clone(),
    ));
    let app = TestApp::from_state(state);
    let token = app.patient("alice");

    let (status, body) = app.get("/api/v1/goals/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/api/v1/reminders/upcoming", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/api/v1/goals/weekly", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "An unexpected error occurred");

    let (status, _) = app.get("/api/v1/dashboard", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.post("/api/v1/goals", &token, water_goal(today())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

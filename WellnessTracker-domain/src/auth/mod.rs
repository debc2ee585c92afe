//! Authentication for the WellnessTracker API
//!
//! Bearer JWT validation middleware, the authenticated user model and the
//! security headers applied to every response.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};

pub mod logging;
pub mod token;

/// Role that may open the patient dashboard
pub const PATIENT_ROLE: &str = "patient";

/// JWT claims accepted by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// User information extracted from authenticated requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub user_id: String,
    pub roles: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// How the user was authenticated ("jwt" or "dev-bypass")
    pub auth_source: String,
}

impl UserInfo {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<Claims> for UserInfo {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            roles: claims.roles,
            first_name: claims.given_name,
            last_name: claims.family_name,
            auth_source: "jwt".to_string(),
        }
    }
}

/// Settings the auth middleware needs
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    /// When set, every request is attributed to this user without a token
    pub bypass_user: Option<String>,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            bypass_user: None,
        }
    }

    /// Enable the development bypass. Ignored in release builds.
    pub fn with_bypass_user(mut self, user_id: impl Into<String>) -> Self {
        if cfg!(debug_assertions) {
            self.bypass_user = Some(user_id.into());
        } else {
            warn!("Ignoring auth bypass in a release build");
        }
        self
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes
pub async fn auth_middleware(State(config): State<AuthConfig>, mut req: Request<Body>, next: Next) -> Response {
    let request_path = req.uri().path().to_string();

    if let Some(dev_user) = &config.bypass_user {
        debug!("Auth bypass enabled in development mode");
        log_auth_event(
            AuthEvent::new(AuthEventType::DevBypass, Some(dev_user), true).with_resource(request_path),
        );
        req.extensions_mut().insert(UserInfo {
            user_id: dev_user.clone(),
            roles: vec![PATIENT_ROLE.to_string()],
            first_name: None,
            last_name: None,
            auth_source: "dev-bypass".to_string(),
        });
        return next.run(req).await;
    }

    let start_time = std::time::Instant::now();
    let fail = |details: &str, user_id: Option<&str>| {
        let event = AuthEvent::new(AuthEventType::TokenValidation, user_id, false)
            .with_details(details)
            .with_resource(request_path.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt");
        log_auth_event(event);
    };

    let token = match req.headers().get(header::AUTHORIZATION).map(|value| value.to_str()) {
        None => {
            fail("Missing Authorization header", None);
            return unauthorized("Authentication credentials were not provided");
        }
        Some(Err(_)) => {
            fail("Invalid Authorization header format", None);
            return unauthorized("Invalid Authorization header");
        }
        Some(Ok(value)) => match value.strip_prefix("Bearer ") {
            Some(token) => token.trim().to_string(),
            None => {
                fail("Authorization header does not contain Bearer token", None);
                return unauthorized("Invalid Authorization header");
            }
        },
    };

    match token::validate_token(&config, &token) {
        Ok(claims) => {
            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                .with_details("JWT validation successful")
                .with_resource(request_path.clone())
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            let user_info = UserInfo::from(claims.clone());
            req.extensions_mut().insert(user_info);
            req.extensions_mut().insert(claims);

            next.run(req).await
        }
        Err(token::SecurityError::TokenExpired) => {
            fail("JWT token has expired", None);
            unauthorized("Token has expired")
        }
        Err(e) => {
            fail(&format!("Token validation error: {}", e), None);
            unauthorized("Invalid token")
        }
    }
}

/// Apply CORS and security headers to the whole application.
///
/// `allowed_origins` containing `*` (or empty) allows any origin.
pub fn configure_security(app: Router, allowed_origins: &[String]) -> Router {
    use tower_http::cors::{AllowOrigin, Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let origins = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension};
    use chrono::Duration;
    use tower::ServiceExt;

    use crate::auth::token::{generate_token, TokenProfile};

    fn config() -> AuthConfig {
        AuthConfig::new("middleware-test-secret", "wellness-tracker")
    }

    async fn whoami(Extension(user): Extension<UserInfo>) -> String {
        format!("{}:{}", user.user_id, user.roles.join(","))
    }

    fn app(config: AuthConfig) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(config, auth_middleware))
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app(config()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(config()).oneshot(request(Some("Basic abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let profile = TokenProfile { roles: vec![PATIENT_ROLE.to_string()], ..Default::default() };
        let token = generate_token(&config(), "alice", profile, Duration::minutes(5)).unwrap();

        let response = app(config())
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"alice:patient");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let token = generate_token(&config(), "alice", TokenProfile::default(), Duration::hours(-2)).unwrap();
        let response = app(config())
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bypass_attributes_dev_user() {
        let config = config().with_bypass_user("dev-user");
        if config.bypass_user.is_none() {
            return;
        }
        let response = app(config).oneshot(request(None)).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"dev-user:patient");
    }

    #[test]
    fn test_user_info_from_claims() {
        let claims = Claims {
            sub: "bob".to_string(),
            iss: "wellness-tracker".to_string(),
            iat: 0,
            exp: 0,
            roles: vec!["doctor".to_string()],
            given_name: Some("Bob".to_string()),
            family_name: Some("Stone".to_string()),
        };
        let user = UserInfo::from(claims);
        assert!(user.has_role("doctor"));
        assert!(!user.has_role(PATIENT_ROLE));
        assert_eq!(user.last_name.as_deref(), Some("Stone"));
    }
}

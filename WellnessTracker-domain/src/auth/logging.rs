use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Bearer token checked by the middleware
    TokenValidation,
    /// Authenticated user lacks the role a resource requires
    AccessDenied,
    /// Development bypass attributed a request to the dev user
    DevBypass,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
            AuthEventType::DevBypass => write!(f, "DEV_BYPASS"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path being accessed
    pub resource: Option<String>,
    /// Time spent authenticating, in milliseconds
    pub duration_ms: Option<u64>,
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    let user_id_str = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id_str,
            status,
            event.timestamp.to_rfc3339(),
            resource,
            details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id_str,
            status,
            event.timestamp.to_rfc3339(),
            resource,
            details
        );
    }
}

/// Log an access denied event
pub fn log_access_denied(user_id: &str, resource: &str, required_roles: &[&str]) {
    let details = format!("Required roles: {}", required_roles.join(", "));

    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
        .with_resource(resource)
        .with_details(details);

    log_auth_event(event);
}

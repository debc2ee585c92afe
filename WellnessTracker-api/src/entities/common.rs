use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;
use utoipa::ToSchema;
use validator::ValidationErrors;

use wellness_tracker_domain::entities::conversions;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self::new("not_found", format!("The requested {} could not be found", resource))
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            details,
            ..Self::new("validation_error", message)
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self::new("bad_request", message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::new("conflict", message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new("forbidden", message)
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self::new("internal_error", "An unexpected error occurred")
    }

    /// Field level validator failures as a 400 with per-field details
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let details: serde_json::Map<String, serde_json::Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                    .collect();
                (field.to_string(), serde_json::json!(messages))
            })
            .collect();
        Self::validation_error("Request validation failed", Some(serde_json::Value::Object(details)))
    }

    /// A JSON body that could not be read or deserialized
    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::bad_request(&rejection.body_text())
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "bad_request" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "forbidden" => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Serde helpers for optional `HH:MM[:SS]` times
pub mod optional_time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_some(&time.format(conversions::TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| conversions::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Keeps an explicit `null` apart from an absent field.
///
/// Use with `#[serde(default, deserialize_with = "nullable::deserialize")]`
/// on an `Option<Option<T>>`: absent is `None`, `null` is `Some(None)`.
pub mod nullable {
    use super::*;

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// `nullable` for `HH:MM[:SS]` times
pub mod nullable_time {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<NaiveTime>>, D::Error> {
        optional_time::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[derive(Serialize, Deserialize)]
    struct Timed {
        #[serde(default, with = "optional_time")]
        at: Option<NaiveTime>,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable::deserialize")]
        interval: Option<Option<u32>>,
        #[serde(default, deserialize_with = "nullable_time::deserialize")]
        at: Option<Option<NaiveTime>>,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorResponse::not_found("goal").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::validation_error("x", None).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(ErrorResponse::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorResponse::internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_details() {
        let errors = Sample { title: String::new() }.validate().unwrap_err();
        let response = ErrorResponse::from_validation(&errors);
        assert_eq!(response.error, "validation_error");
        assert_eq!(response.details.unwrap()["title"][0], "Title is required");
    }

    #[test]
    fn test_optional_time_accepts_short_form() {
        let parsed: Timed = serde_json::from_str(r#"{"at":"09:30"}"#).unwrap();
        assert_eq!(parsed.at, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"at":"09:30:00"}"#);

        let empty: Timed = serde_json::from_str("{}").unwrap();
        assert!(empty.at.is_none());
        assert!(serde_json::from_str::<Timed>(r#"{"at":"9am"}"#).is_err());
    }

    #[test]
    fn test_nullable_keeps_null_apart_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.interval, None);
        assert_eq!(absent.at, None);

        let cleared: Patch = serde_json::from_str(r#"{"interval":null,"at":null}"#).unwrap();
        assert_eq!(cleared.interval, Some(None));
        assert_eq!(cleared.at, Some(None));

        let set: Patch = serde_json::from_str(r#"{"interval":30,"at":"07:45"}"#).unwrap();
        assert_eq!(set.interval, Some(Some(30)));
        assert_eq!(set.at, Some(NaiveTime::from_hms_opt(7, 45, 0)));
    }
}

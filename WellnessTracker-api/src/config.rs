//! Application configuration loaded from environment variables

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use wellness_tracker_domain::auth::AuthConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_JWT_ISSUER: &str = "wellness-tracker";
pub const DEFAULT_DEV_USER_ID: &str = "dev-user";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server level settings. Database settings live in `DatabaseConfig`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Deployment environment name reported by the health check
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Insert the built-in health tips at start-up
    pub seed_health_tips: bool,
    /// Development only: attribute every request to `dev_user_id`
    pub bypass_auth: bool,
    pub dev_user_id: String,
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value: value.to_string() }),
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_value = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_value
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::Invalid { name: "HOST", value: host_value.clone() })?;

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let seed_health_tips = match lookup("SEED_HEALTH_TIPS") {
            Some(value) => parse_bool("SEED_HEALTH_TIPS", &value)?,
            None => true,
        };

        // Any value enables the bypass, as long as it is a debug build
        let bypass_auth = cfg!(debug_assertions) && lookup("BYPASS_AUTH").is_some();

        Ok(Self {
            host,
            port,
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            cors_allowed_origins,
            seed_health_tips,
            bypass_auth,
            dev_user_id: lookup("DEV_USER_ID").unwrap_or_else(|| DEFAULT_DEV_USER_ID.to_string()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Settings for the authentication middleware
    pub fn auth_config(&self) -> AuthConfig {
        let config = AuthConfig::new(self.jwt_secret.clone(), self.jwt_issuer.clone());
        if self.bypass_auth {
            config.with_bypass_user(self.dev_user_id.clone())
        } else {
            config
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.jwt_issuer, "wellness-tracker");
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert!(config.seed_health_tips);
        assert!(!config.bypass_auth);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_secret_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("JWT_SECRET"))));
        assert!(matches!(load(&[("JWT_SECRET", "")]), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("SEED_HEALTH_TIPS", "false"),
            ("APP_ENV", "production"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.cors_allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert!(!config.seed_health_tips);
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("PORT", "http")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("SEED_HEALTH_TIPS", "maybe")]),
            Err(ConfigError::Invalid { name: "SEED_HEALTH_TIPS", .. })
        ));
    }

    #[test]
    fn test_bypass_only_in_debug_builds() {
        let config = load(&[("JWT_SECRET", "s"), ("BYPASS_AUTH", "1")]).unwrap();
        assert_eq!(config.bypass_auth, cfg!(debug_assertions));
        assert_eq!(config.auth_config().bypass_user.is_some(), cfg!(debug_assertions));
    }
}

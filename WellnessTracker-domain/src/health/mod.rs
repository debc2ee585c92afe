//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::warn;

use wellness_tracker_data::database::{self, DatabasePool};

/// A ping slower than this marks the database as degraded
pub const SLOW_PING_THRESHOLD: Duration = Duration::from_millis(500);

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// Ok(true) when healthy, Ok(false) when degraded, Err when unreachable.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service that pings the SQLite pool
#[derive(Debug, Clone)]
pub struct DatabaseHealthService {
    pool: DatabasePool,
}

impl DatabaseHealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for DatabaseHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Database is available but responding slowly".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let overall_status = match db_component.status {
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Healthy => SystemStatus::Healthy,
        };

        SystemHealth {
            status: overall_status,
            components: vec![("database".to_string(), db_component)].into_iter().collect(),
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        let pool = self.pool.clone();
        let started = Instant::now();

        let ping = tokio::task::spawn_blocking(move || pool.ping())
            .await
            .map_err(|e| format!("Health check task failed: {}", e))?;

        match ping {
            Ok(()) => {
                let elapsed = started.elapsed();
                if elapsed > SLOW_PING_THRESHOLD {
                    warn!("Database ping took {:?}", elapsed);
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            Err(e) => Err(format!("Database connection error: {}", e)),
        }
    }
}

/// Describe the database the pool points at
pub fn database_description(pool: &DatabasePool) -> String {
    database::get_connection_info(pool).unwrap_or_else(|e| format!("unavailable ({})", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellness_tracker_data::database::in_memory_pool;

    #[tokio::test]
    async fn test_get_system_health() {
        let service = DatabaseHealthService::new(in_memory_pool().unwrap());
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("database"));
    }

    #[test]
    fn test_database_description() {
        let pool = in_memory_pool().unwrap();
        assert!(database_description(&pool).contains("memory"));
    }
}

//! Database connection module for the WellnessTracker application
//!
//! All persistence goes through an r2d2 pool of SQLite connections. Every
//! pooled connection has foreign keys enabled, so goal logs are removed
//! together with their goal.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{debug, error, info};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Path value that selects a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// A connection checked out of the pool
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "./data/wellness.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value.parse::<u32>().map_err(|_| {
                DatabaseError::ConfigError(format!("DB_MAX_CONNECTIONS must be a positive number, got {}", value))
            })?,
            Err(_) => defaults.max_connections,
        };

        if max_connections == 0 {
            return Err(DatabaseError::ConfigError("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: MEMORY_PATH.to_string(),
            // Each in-memory connection is its own database, so the pool must hold exactly one
            max_connections: 1,
            ..Self::default()
        }
    }

    /// Whether this configuration points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.sqlite_path == MEMORY_PATH
    }
}

/// Shared handle to the SQLite connection pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("DatabasePool")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl DatabasePool {
    /// Check a connection out of the pool
    pub fn get(&self) -> Result<SqliteConnection, r2d2::Error> {
        self.pool.get()
    }

    /// Current pool statistics
    pub fn state(&self) -> r2d2::State {
        self.pool.state()
    }

    /// Run a trivial query to prove the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

/// Initialize the database connection pool and bring the schema up to date
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let manager = if config.is_in_memory() {
        info!("Initializing in-memory SQLite database");
        SqliteConnectionManager::memory()
    } else {
        info!("Initializing SQLite database at: {}", config.sqlite_path);

        if let Some(parent) = Path::new(&config.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent)?;
            }
        }

        SqliteConnectionManager::file(&config.sqlite_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
    };

    let manager = manager.with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))
    });

    let mut builder = r2d2::Pool::builder()
        .connection_timeout(Duration::from_secs(config.timeout_seconds));

    builder = if config.is_in_memory() {
        // The database lives only as long as its single connection
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(config.max_connections)
    };

    let pool = builder
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::SqlitePoolError(e)
        })?;

    let pool = DatabasePool { pool: Arc::new(pool) };

    run_migrations(&pool)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Create a migrated in-memory pool
pub fn in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    initialize_database_pool(&DatabaseConfig::in_memory())
}

/// Run database migrations
fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Get information about the current database connection
pub fn get_connection_info(pool: &DatabasePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;

    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;
    debug!("PRAGMA database_list reported file: {:?}", path);

    let location = if path.is_empty() || path == MEMORY_PATH {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", path)
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}

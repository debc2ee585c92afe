use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_wellness_goals_table(conn)?;
    create_goal_logs_table(conn)?;
    create_reminders_table(conn)?;
    create_health_tips_table(conn)?;
    create_indexes(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the wellness goals table
///
/// One goal per user, type and day is enforced by the UNIQUE constraint.
fn create_wellness_goals_table(conn: &Connection) -> Result<(), String> {
    info!("Creating wellness_goals table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wellness_goals (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            title TEXT NOT NULL,
            target_value REAL NOT NULL,
            current_value REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            extra_data TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, goal_type, date)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the append-only goal progress log
fn create_goal_logs_table(conn: &Connection) -> Result<(), String> {
    info!("Creating goal_logs table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS goal_logs (
            id TEXT PRIMARY KEY,
            goal_id TEXT NOT NULL REFERENCES wellness_goals (id) ON DELETE CASCADE,
            value REAL NOT NULL,
            notes TEXT,
            logged_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_reminders_table(conn: &Connection) -> Result<(), String> {
    info!("Creating preventive_care_reminders table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preventive_care_reminders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            reminder_type TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            scheduled_date TEXT NOT NULL,
            scheduled_time TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming',
            location TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            is_recurring INTEGER NOT NULL DEFAULT 0,
            recurrence_interval INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_health_tips_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_tips table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_tips (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'general',
            is_active INTEGER NOT NULL DEFAULT 1,
            display_date TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create indexes for the user-scoped date lookups and tip title uniqueness
fn create_indexes(conn: &Connection) -> Result<(), String> {
    info!("Creating indexes");

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_wellness_goals_user_date
            ON wellness_goals (user_id, date DESC);
        CREATE INDEX IF NOT EXISTS idx_goal_logs_goal
            ON goal_logs (goal_id, logged_at DESC);
        CREATE INDEX IF NOT EXISTS idx_reminders_user_schedule
            ON preventive_care_reminders (user_id, status, scheduled_date);
        CREATE INDEX IF NOT EXISTS idx_health_tips_display_date
            ON health_tips (is_active, display_date);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_health_tips_title
            ON health_tips (title);",
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn test_goal_uniqueness_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO wellness_goals
            (id, user_id, goal_type, title, target_value, date, created_at, updated_at)
            VALUES (?1, 'u1', 'steps', 'Daily Steps', 6000, '2024-03-01', 'now', 'now')";

        conn.execute(insert, ["a"]).unwrap();
        assert!(conn.execute(insert, ["b"]).is_err());
    }

    #[test]
    fn test_tip_title_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO health_tips (id, title, content, created_at)
            VALUES (?1, 'Sleep Well', 'Seven to nine hours', 'now')";

        conn.execute(insert, ["a"]).unwrap();
        assert!(conn.execute(insert, ["b"]).is_err());
    }
}

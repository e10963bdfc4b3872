//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PROFILES
        -- One row per user
        -- ============================================
        CREATE TABLE profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT,
            last_name TEXT,
            profile_name TEXT,                   -- public handle, preferred for display
            email TEXT,
            age INTEGER,
            gender TEXT,
            avatar_url TEXT,                     -- uploaded elsewhere, only the URL lives here
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- EXERCISES
        -- Catalogue of movements
        -- ============================================
        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL CHECK(kind IN ('strength', 'run')) DEFAULT 'strength',
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_exercises_category ON exercises(category);

        -- ============================================
        -- WORKOUTS
        -- Templates authored ahead of time
        -- ============================================
        CREATE TABLE workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            workout_type TEXT NOT NULL CHECK(workout_type IN ('strength', 'cardio', 'flexibility', 'hiit')) DEFAULT 'strength',
            is_wod INTEGER NOT NULL DEFAULT 0,   -- boolean
            scheduled_date TEXT NOT NULL,        -- ISO date: "2025-01-09"
            created_by INTEGER REFERENCES profiles(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_workouts_wod ON workouts(is_wod, scheduled_date);

        -- ============================================
        -- WORKOUT EXERCISES
        -- Prescription of one exercise inside a workout
        -- ============================================
        CREATE TABLE workout_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
            order_index INTEGER NOT NULL,
            sets INTEGER NOT NULL DEFAULT 3,
            reps INTEGER NOT NULL DEFAULT 10,
            weight_kg REAL NOT NULL DEFAULT 0,
            distance_m REAL,
            time_min REAL
        );

        CREATE INDEX idx_workout_exercises_workout ON workout_exercises(workout_id, order_index);

        -- ============================================
        -- WORKOUT LOGS
        -- Completed sessions; score is frozen at insert
        -- ============================================
        CREATE TABLE workout_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES profiles(id) ON DELETE SET NULL,
            workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE RESTRICT,
            notes TEXT NOT NULL DEFAULT '',
            score REAL NOT NULL DEFAULT 0,
            completed_at TEXT NOT NULL,          -- RFC 3339, UTC
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_workout_logs_completed ON workout_logs(completed_at);
        CREATE INDEX idx_workout_logs_user ON workout_logs(user_id, completed_at);

        -- ============================================
        -- EXERCISE SCORES
        -- Every logged set
        -- ============================================
        CREATE TABLE exercise_scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_log_id INTEGER NOT NULL REFERENCES workout_logs(id) ON DELETE CASCADE,
            user_id INTEGER REFERENCES profiles(id) ON DELETE SET NULL,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
            set_index INTEGER NOT NULL,
            weight_kg REAL NOT NULL DEFAULT 0,
            reps INTEGER NOT NULL DEFAULT 0,
            distance_m REAL,
            time_min REAL
        );

        CREATE INDEX idx_exercise_scores_log ON exercise_scores(workout_log_id);
        CREATE INDEX idx_exercise_scores_user_weight ON exercise_scores(user_id, weight_kg);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version; 0 before the first migration
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let tracked: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
        [],
        |row| row.get(0),
    )?;
    if !tracked {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_unreadable_version_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_migrations (version TEXT);
             INSERT INTO schema_migrations (version) VALUES ('v1');",
        )
        .unwrap();

        assert!(get_schema_version(&conn).is_err());
        assert!(run_migrations(&conn).is_err());
    }
}

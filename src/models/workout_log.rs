//! Workout log model
//!
//! A completed session. The score is computed once, when the session is
//! logged, and never recomputed from the stored sets afterwards.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{ExerciseScore, Profile, Workout, WorkoutExercise};
use crate::db::{DbError, DbResult};
use crate::scoring::{score_workout, ExerciseLog, LogRow, ProfileRef, TimeWindow, WorkoutScore};

/// Default number of sessions returned by history queries
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub workout_id: i64,
    pub notes: String,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
    pub created_at: String,
}

/// Everything needed to record a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLogCreate {
    pub user_id: i64,
    pub workout_id: i64,
    pub notes: String,
    /// Logs in the same order as the workout's planned exercises
    pub logs: Vec<ExerciseLog>,
    /// Defaults to now
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of recording a session
#[derive(Debug, Clone, Serialize)]
pub struct LoggedSession {
    pub log: WorkoutLog,
    pub score: WorkoutScore,
    pub sets_recorded: usize,
    /// Logs that did not line up with a planned exercise and were not stored
    pub ignored_logs: usize,
}

/// A log joined with its workout, for history views
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutLogSummary {
    pub id: i64,
    pub workout_id: i64,
    pub workout_name: String,
    pub notes: String,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}

/// Timestamps are stored as fixed-width RFC 3339 in UTC so that string
/// comparison in SQL orders them correctly.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn timestamp_column(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("bad timestamp '{}' in {}", raw, column).into(),
        )
    })
}

impl WorkoutLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            workout_id: row.get("workout_id")?,
            notes: row.get("notes")?,
            score: row.get("score")?,
            completed_at: timestamp_column(row, "completed_at")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Score a session and store it with every logged set, atomically
    pub fn log_session(conn: &mut Connection, data: &WorkoutLogCreate) -> DbResult<LoggedSession> {
        let tx = conn.transaction()?;

        if Workout::get_by_id(&tx, data.workout_id)?.is_none() {
            return Err(DbError::NotFound(format!("workout {}", data.workout_id)));
        }
        if Profile::get_by_id(&tx, data.user_id)?.is_none() {
            return Err(DbError::NotFound(format!("profile {}", data.user_id)));
        }

        let planned = WorkoutExercise::list_planned(&tx, data.workout_id)?;
        let score = score_workout(&planned, &data.logs);
        let completed_at = data.completed_at.unwrap_or_else(Utc::now);

        tx.execute(
            r#"
            INSERT INTO workout_logs (user_id, workout_id, notes, score, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.user_id,
                data.workout_id,
                data.notes,
                score.total,
                format_timestamp(&completed_at),
            ],
        )?;
        let log_id = tx.last_insert_rowid();

        let mut sets_recorded = 0;
        let mut ignored_logs = 0;
        for (i, log) in data.logs.iter().enumerate() {
            let matches_plan = planned
                .get(i)
                .is_some_and(|p| p.exercise_id == log.exercise_id);
            if !matches_plan {
                ignored_logs += 1;
                continue;
            }
            for (set_index, set) in log.sets.iter().enumerate() {
                ExerciseScore::insert(&tx, log_id, data.user_id, log.exercise_id, set_index, set)?;
                sets_recorded += 1;
            }
        }

        let log = Self::get_by_id(&tx, log_id)?
            .ok_or_else(|| DbError::NotFound(format!("workout log {}", log_id)))?;
        tx.commit()?;

        if ignored_logs > 0 {
            tracing::warn!(
                log_id,
                ignored_logs,
                "exercise logs did not match the workout's planned exercises"
            );
        }
        tracing::info!(log_id, user_id = data.user_id, score = score.total, "workout logged");

        Ok(LoggedSession {
            log,
            score,
            sets_recorded,
            ignored_logs,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workout_logs WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent sessions of a user
    pub fn history_for_user(
        conn: &Connection,
        user_id: i64,
        limit: Option<i64>,
    ) -> DbResult<Vec<WorkoutLogSummary>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT wl.id, wl.workout_id, w.name AS workout_name, wl.notes, wl.score, wl.completed_at
            FROM workout_logs wl
            JOIN workouts w ON w.id = wl.workout_id
            WHERE wl.user_id = ?1
            ORDER BY wl.completed_at DESC, wl.id DESC
            LIMIT ?2
            "#,
        )?;
        let history = stmt
            .query_map(
                params![user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(0)],
                |row| {
                    Ok(WorkoutLogSummary {
                        id: row.get("id")?,
                        workout_id: row.get("workout_id")?,
                        workout_name: row.get("workout_name")?,
                        notes: row.get("notes")?,
                        score: row.get("score")?,
                        completed_at: timestamp_column(row, "completed_at")?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }

    /// Leaderboard input: every log completed inside the window, with its
    /// profile when the user still exists
    pub fn list_in_window(conn: &Connection, window: &TimeWindow) -> DbResult<Vec<LogRow>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT wl.user_id, wl.score, wl.completed_at,
                   p.id AS profile_id, p.first_name, p.last_name, p.profile_name
            FROM workout_logs wl
            LEFT JOIN profiles p ON p.id = wl.user_id
            WHERE wl.completed_at >= ?1 AND wl.completed_at <= ?2
            ORDER BY wl.completed_at, wl.id
            "#,
        )?;
        let rows = stmt
            .query_map(
                params![format_timestamp(&window.start), format_timestamp(&window.end)],
                |row| {
                    let profile_id: Option<i64> = row.get("profile_id")?;
                    let profile = match profile_id {
                        Some(id) => Some(ProfileRef {
                            id,
                            first_name: row.get("first_name")?,
                            last_name: row.get("last_name")?,
                            profile_name: row.get("profile_name")?,
                        }),
                        None => None,
                    };
                    Ok(LogRow {
                        user_id: row.get("user_id")?,
                        score: row.get("score")?,
                        completed_at: timestamp_column(row, "completed_at")?,
                        profile,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Notes are the only editable part of a logged session
    pub fn update_notes(conn: &Connection, id: i64, notes: &str) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            "UPDATE workout_logs SET notes = ?1 WHERE id = ?2",
            params![notes, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Delete a session and its sets
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        // Sets are deleted via CASCADE
        let rows = conn.execute("DELETE FROM workout_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{
        Exercise, ExerciseCreate, ProfileCreate, WorkoutCreate, WorkoutExerciseCreate, WorkoutType,
    };
    use crate::scoring::{aggregate, ExerciseKind, SetEntry};
    use chrono::{NaiveDate, TimeZone};

    struct Fixture {
        user_a: i64,
        user_b: i64,
        workout_id: i64,
        squat_id: i64,
        run_id: i64,
    }

    fn seed(conn: &Connection) -> DbResult<Fixture> {
        let user_a = Profile::create(
            conn,
            &ProfileCreate {
                profile_name: Some("alpha".into()),
                ..Default::default()
            },
        )?
        .id;
        let user_b = Profile::create(
            conn,
            &ProfileCreate {
                first_name: Some("Bea".into()),
                last_name: Some("Stone".into()),
                ..Default::default()
            },
        )?
        .id;
        let workout_id = Workout::create(
            conn,
            &WorkoutCreate {
                name: "Squat & Run".into(),
                description: String::new(),
                workout_type: WorkoutType::Hiit,
                is_wod: true,
                scheduled_date: Some("2025-03-14".into()),
                created_by: Some(user_a),
            },
        )?
        .id;
        let squat_id = Exercise::create(
            conn,
            &ExerciseCreate {
                name: "Back Squat".into(),
                category: "legs".into(),
                kind: ExerciseKind::Strength,
                notes: None,
            },
        )?
        .id;
        let run_id = Exercise::create(
            conn,
            &ExerciseCreate {
                name: "Run".into(),
                category: "cardio".into(),
                kind: ExerciseKind::Run,
                notes: None,
            },
        )?
        .id;
        for exercise_id in [squat_id, run_id] {
            WorkoutExercise::create(
                conn,
                &WorkoutExerciseCreate {
                    workout_id,
                    exercise_id,
                    sets: 2,
                    reps: 5,
                    weight_kg: 100.0,
                    distance_m: None,
                    time_min: None,
                },
            )?;
        }
        Ok(Fixture {
            user_a,
            user_b,
            workout_id,
            squat_id,
            run_id,
        })
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    fn session(f: &Fixture, user_id: i64, hour: u32, squat_kg: f64) -> WorkoutLogCreate {
        WorkoutLogCreate {
            user_id,
            workout_id: f.workout_id,
            notes: String::new(),
            logs: vec![
                ExerciseLog {
                    exercise_id: f.squat_id,
                    sets: vec![SetEntry::strength(squat_kg, 5), SetEntry::strength(80.0, 8)],
                },
                ExerciseLog {
                    exercise_id: f.run_id,
                    sets: vec![SetEntry::run(400.0, 2.0)],
                },
            ],
            completed_at: Some(at(hour)),
        }
    }

    #[test]
    fn test_log_session_scores_and_stores_sets() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            let logged = WorkoutLog::log_session(conn, &session(&f, f.user_a, 9, 100.0))?;

            assert!((logged.log.score - 1570.0).abs() < 1e-9);
            assert_eq!(logged.sets_recorded, 3);
            assert_eq!(logged.ignored_logs, 0);
            assert_eq!(logged.log.completed_at, at(9));

            let sets = ExerciseScore::list_for_log(conn, logged.log.id)?;
            assert_eq!(sets.len(), 3);
            assert_eq!(sets[0].weight_kg, 100.0);
            assert_eq!(sets[2].distance_m, Some(400.0));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_score_is_frozen() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            let logged = WorkoutLog::log_session(conn, &session(&f, f.user_a, 9, 100.0))?;

            // Changing the stored sets does not touch the session score
            conn.execute("UPDATE exercise_scores SET weight_kg = 500", [])?;
            let updated = WorkoutLog::update_notes(conn, logged.log.id, "felt heavy")?.unwrap();
            assert_eq!(updated.notes, "felt heavy");
            assert_eq!(updated.score, logged.log.score);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_mismatched_log_is_ignored() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            let mut data = session(&f, f.user_a, 9, 100.0);
            data.logs.swap(0, 1);
            let logged = WorkoutLog::log_session(conn, &data)?;
            assert_eq!(logged.log.score, 0.0);
            assert_eq!(logged.ignored_logs, 2);
            assert_eq!(logged.sets_recorded, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unknown_user_rolls_back() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            let result = WorkoutLog::log_session(conn, &session(&f, 999, 9, 100.0));
            assert!(matches!(result, Err(DbError::NotFound(_))));
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM workout_logs", [], |r| r.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_window_query_feeds_leaderboard() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            WorkoutLog::log_session(conn, &session(&f, f.user_b, 7, 100.0))?;
            WorkoutLog::log_session(conn, &session(&f, f.user_a, 8, 120.0))?;
            WorkoutLog::log_session(conn, &session(&f, f.user_b, 23, 100.0))?;

            let mut next_day = session(&f, f.user_a, 9, 300.0);
            next_day.completed_at = Some(at(9) + chrono::Duration::days(1));
            WorkoutLog::log_session(conn, &next_day)?;

            let window = TimeWindow::day(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
            let rows = WorkoutLog::list_in_window(conn, &window)?;
            assert_eq!(rows.len(), 3);

            let ranked = aggregate(&rows, &window);
            assert_eq!(ranked.len(), 2);
            assert_eq!(ranked[0].user_id, f.user_b);
            assert_eq!(ranked[0].display_name, "Bea Stone");
            assert_eq!(ranked[0].total_workouts, 2);
            assert_eq!(ranked[1].display_name, "alpha");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_deleted_profile_drops_out_of_rankings() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            WorkoutLog::log_session(conn, &session(&f, f.user_b, 7, 100.0))?;
            WorkoutLog::log_session(conn, &session(&f, f.user_a, 8, 100.0))?;
            Profile::delete(conn, f.user_b)?;

            let window = TimeWindow::day(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
            let rows = WorkoutLog::list_in_window(conn, &window)?;
            assert_eq!(rows.len(), 2);
            assert!(rows.iter().any(|r| r.user_id.is_none()));

            let ranked = aggregate(&rows, &window);
            assert_eq!(ranked.len(), 1);
            assert_eq!(ranked[0].user_id, f.user_a);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_history_most_recent_first() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let f = seed(conn)?;
            WorkoutLog::log_session(conn, &session(&f, f.user_a, 6, 100.0))?;
            WorkoutLog::log_session(conn, &session(&f, f.user_a, 18, 100.0))?;

            let history = WorkoutLog::history_for_user(conn, f.user_a, None)?;
            assert_eq!(history.len(), 2);
            assert_eq!(history[0].completed_at, at(18));
            assert_eq!(history[0].workout_name, "Squat & Run");

            assert_eq!(WorkoutLog::history_for_user(conn, f.user_a, Some(1))?.len(), 1);
            assert!(WorkoutLog::history_for_user(conn, f.user_b, None)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = at(13);
        assert_eq!(format_timestamp(&ts), "2025-03-14T13:00:00.000Z");
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}

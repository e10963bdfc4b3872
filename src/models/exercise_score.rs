//! Exercise score model
//!
//! Every set logged in a session, stored in kilograms, meters and minutes.
//! Personal records are read from here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::workout_log::parse_timestamp;
use crate::db::DbResult;
use crate::scoring::SetEntry;

/// Default number of personal records returned
pub const DEFAULT_RECORD_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseScore {
    pub id: i64,
    pub workout_log_id: i64,
    pub user_id: Option<i64>,
    pub exercise_id: i64,
    pub set_index: i64,
    pub weight_kg: f64,
    pub reps: u32,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

/// A heaviest set, with where it came from
#[derive(Debug, Clone, Serialize)]
pub struct PersonalRecord {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub reps: u32,
    pub workout_log_id: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExerciseScore {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_log_id: row.get("workout_log_id")?,
            user_id: row.get("user_id")?,
            exercise_id: row.get("exercise_id")?,
            set_index: row.get("set_index")?,
            weight_kg: row.get("weight_kg")?,
            reps: row.get("reps")?,
            distance_m: row.get("distance_m")?,
            time_min: row.get("time_min")?,
        })
    }

    /// Store one set of a session. Missing weight is stored as zero.
    pub fn insert(
        conn: &Connection,
        workout_log_id: i64,
        user_id: i64,
        exercise_id: i64,
        set_index: usize,
        set: &SetEntry,
    ) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO exercise_scores
            (workout_log_id, user_id, exercise_id, set_index, weight_kg, reps, distance_m, time_min)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                workout_log_id,
                user_id,
                exercise_id,
                set_index as i64,
                set.weight_kg.unwrap_or(0.0),
                set.reps,
                set.distance_m,
                set.time_min,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Sets of a session in logging order
    pub fn list_for_log(conn: &Connection, workout_log_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM exercise_scores WHERE workout_log_id = ?1 ORDER BY id",
        )?;
        let scores = stmt
            .query_map([workout_log_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(scores)
    }

    /// Heaviest strength sets of a user, heaviest first
    pub fn personal_records(
        conn: &Connection,
        user_id: i64,
        limit: Option<i64>,
    ) -> DbResult<Vec<PersonalRecord>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT es.exercise_id, e.name AS exercise_name, es.weight_kg, es.reps,
                   es.workout_log_id, wl.completed_at
            FROM exercise_scores es
            JOIN exercises e ON e.id = es.exercise_id
            JOIN workout_logs wl ON wl.id = es.workout_log_id
            WHERE es.user_id = ?1 AND e.kind = 'strength'
            ORDER BY es.weight_kg DESC, es.reps DESC, es.id
            LIMIT ?2
            "#,
        )?;
        let records = stmt
            .query_map(
                params![user_id, limit.unwrap_or(DEFAULT_RECORD_LIMIT).max(0)],
                |row| {
                    let completed_at: String = row.get("completed_at")?;
                    Ok(PersonalRecord {
                        exercise_id: row.get("exercise_id")?,
                        exercise_name: row.get("exercise_name")?,
                        weight_kg: row.get("weight_kg")?,
                        reps: row.get("reps")?,
                        workout_log_id: row.get("workout_log_id")?,
                        completed_at: parse_timestamp(&completed_at),
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{
        Exercise, ExerciseCreate, Profile, ProfileCreate, Workout, WorkoutCreate, WorkoutExercise,
        WorkoutExerciseCreate, WorkoutLog, WorkoutLogCreate, WorkoutType,
    };
    use crate::scoring::{ExerciseKind, ExerciseLog};

    #[test]
    fn test_personal_records_heaviest_first() {
        let db = test_database();
        db.with_conn_mut(|conn| {
            let user = Profile::create(conn, &ProfileCreate::default())?.id;
            let workout = Workout::create(
                conn,
                &WorkoutCreate {
                    name: "Deadlift day".into(),
                    description: String::new(),
                    workout_type: WorkoutType::Strength,
                    is_wod: false,
                    scheduled_date: Some("2025-03-14".into()),
                    created_by: None,
                },
            )?;
            let mut exercise_ids = Vec::new();
            for (name, kind) in [("Deadlift", ExerciseKind::Strength), ("Run", ExerciseKind::Run)] {
                let ex = Exercise::create(
                    conn,
                    &ExerciseCreate {
                        name: name.into(),
                        category: String::new(),
                        kind,
                        notes: None,
                    },
                )?;
                WorkoutExercise::create(
                    conn,
                    &WorkoutExerciseCreate {
                        workout_id: workout.id,
                        exercise_id: ex.id,
                        sets: 1,
                        reps: 1,
                        weight_kg: 0.0,
                        distance_m: None,
                        time_min: None,
                    },
                )?;
                exercise_ids.push(ex.id);
            }

            let weights = [140.0, 180.0, 160.0, 100.0, 120.0, 170.0];
            WorkoutLog::log_session(
                conn,
                &WorkoutLogCreate {
                    user_id: user,
                    workout_id: workout.id,
                    notes: String::new(),
                    logs: vec![
                        ExerciseLog {
                            exercise_id: exercise_ids[0],
                            sets: weights.iter().map(|w| SetEntry::strength(*w, 3)).collect(),
                        },
                        ExerciseLog {
                            exercise_id: exercise_ids[1],
                            sets: vec![SetEntry {
                                weight_kg: Some(999.0),
                                ..SetEntry::run(5000.0, 25.0)
                            }],
                        },
                    ],
                    completed_at: None,
                },
            )?;

            let records = ExerciseScore::personal_records(conn, user, None)?;
            let top: Vec<f64> = records.iter().map(|r| r.weight_kg).collect();
            assert_eq!(top, vec![180.0, 170.0, 160.0, 140.0, 120.0]);
            assert_eq!(records[0].exercise_name, "Deadlift");
            assert!(records[0].completed_at.is_some());
            Ok(())
        })
        .unwrap();
    }
}

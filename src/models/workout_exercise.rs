//! Workout exercise model
//!
//! The prescription of one exercise inside a workout template: sets, reps,
//! weight (kg) and, for runs, distance (m) and time (min).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::exercise::kind_from_column;
use super::Exercise;
use crate::db::{DbError, DbResult};
use crate::scoring::PlannedExercise;

/// Allowed number of planned sets; a log sheet is prefilled with this many rows
pub const PLANNED_SETS_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

fn check_sets(sets: u32) -> DbResult<()> {
    if PLANNED_SETS_RANGE.contains(&sets) {
        Ok(())
    } else {
        Err(DbError::Invalid(format!(
            "sets must be between {} and {}, got {}",
            PLANNED_SETS_RANGE.start(),
            PLANNED_SETS_RANGE.end(),
            sets
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub order_index: i32,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

/// Data for adding an exercise to a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExerciseCreate {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

/// Data for updating a prescription
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutExerciseUpdate {
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight_kg: Option<f64>,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

impl WorkoutExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_id: row.get("workout_id")?,
            exercise_id: row.get("exercise_id")?,
            order_index: row.get("order_index")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight_kg: row.get("weight_kg")?,
            distance_m: row.get("distance_m")?,
            time_min: row.get("time_min")?,
        })
    }

    /// Append an exercise at the end of the workout
    pub fn create(conn: &Connection, data: &WorkoutExerciseCreate) -> DbResult<Self> {
        check_sets(data.sets)?;
        if Exercise::get_by_id(conn, data.exercise_id)?.is_none() {
            return Err(DbError::NotFound(format!("exercise {}", data.exercise_id)));
        }

        let next_order: i32 = conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM workout_exercises WHERE workout_id = ?1",
            [data.workout_id],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO workout_exercises
            (workout_id, exercise_id, order_index, sets, reps, weight_kg, distance_m, time_min)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.workout_id,
                data.exercise_id,
                next_order,
                data.sets,
                data.reps,
                data.weight_kg,
                data.distance_m,
                data.time_min,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| DbError::NotFound(format!("workout exercise {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workout_exercises WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(we) => Ok(Some(we)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Planned exercises of a workout in order, joined with the exercise catalogue
    pub fn list_planned(conn: &Connection, workout_id: i64) -> DbResult<Vec<PlannedExercise>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT we.id, we.exercise_id, e.name, e.kind, we.order_index,
                   we.sets, we.reps, we.weight_kg, we.distance_m, we.time_min
            FROM workout_exercises we
            JOIN exercises e ON e.id = we.exercise_id
            WHERE we.workout_id = ?1
            ORDER BY we.order_index, we.id
            "#,
        )?;
        let planned = stmt
            .query_map([workout_id], |row| {
                Ok(PlannedExercise {
                    workout_exercise_id: row.get("id")?,
                    exercise_id: row.get("exercise_id")?,
                    name: row.get("name")?,
                    kind: kind_from_column(row, "kind")?,
                    order_index: row.get("order_index")?,
                    sets: row.get("sets")?,
                    reps: row.get("reps")?,
                    weight_kg: row.get("weight_kg")?,
                    distance_m: row.get("distance_m")?,
                    time_min: row.get("time_min")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(planned)
    }

    pub fn update(
        conn: &Connection,
        id: i64,
        data: &WorkoutExerciseUpdate,
    ) -> DbResult<Option<Self>> {
        if let Some(sets) = data.sets {
            check_sets(sets)?;
        }
        let current = match Self::get_by_id(conn, id)? {
            Some(we) => we,
            None => return Ok(None),
        };

        conn.execute(
            r#"
            UPDATE workout_exercises
            SET sets = ?1, reps = ?2, weight_kg = ?3, distance_m = ?4, time_min = ?5
            WHERE id = ?6
            "#,
            params![
                data.sets.unwrap_or(current.sets),
                data.reps.unwrap_or(current.reps),
                data.weight_kg.unwrap_or(current.weight_kg),
                data.distance_m.or(current.distance_m),
                data.time_min.or(current.time_min),
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM workout_exercises WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{ExerciseCreate, Workout, WorkoutCreate, WorkoutType};
    use crate::scoring::ExerciseKind;

    #[test]
    fn test_planned_exercises_keep_order() {
        let db = test_database();
        db.with_conn(|conn| {
            let workout = Workout::create(
                conn,
                &WorkoutCreate {
                    name: "Legs".into(),
                    description: String::new(),
                    workout_type: WorkoutType::Strength,
                    is_wod: false,
                    scheduled_date: Some("2025-03-14".into()),
                    created_by: None,
                },
            )?;
            let squat = Exercise::create(
                conn,
                &ExerciseCreate {
                    name: "Back Squat".into(),
                    category: "legs".into(),
                    kind: ExerciseKind::Strength,
                    notes: None,
                },
            )?;
            let run = Exercise::create(
                conn,
                &ExerciseCreate {
                    name: "Run".into(),
                    category: "cardio".into(),
                    kind: ExerciseKind::Run,
                    notes: None,
                },
            )?;

            for (exercise_id, distance) in [(squat.id, None), (run.id, Some(400.0))] {
                WorkoutExercise::create(
                    conn,
                    &WorkoutExerciseCreate {
                        workout_id: workout.id,
                        exercise_id,
                        sets: 3,
                        reps: 5,
                        weight_kg: 100.0,
                        distance_m: distance,
                        time_min: None,
                    },
                )?;
            }

            let planned = WorkoutExercise::list_planned(conn, workout.id)?;
            assert_eq!(planned.len(), 2);
            assert_eq!(planned[0].name, "Back Squat");
            assert_eq!(planned[0].order_index, 0);
            assert_eq!(planned[1].kind, ExerciseKind::Run);
            assert_eq!(planned[1].order_index, 1);
            assert_eq!(planned[1].distance_m, Some(400.0));

            let updated = WorkoutExercise::update(
                conn,
                planned[0].workout_exercise_id,
                &WorkoutExerciseUpdate {
                    reps: Some(8),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(updated.reps, 8);
            assert_eq!(updated.sets, 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unknown_exercise_rejected() {
        let db = test_database();
        let result = db.with_conn(|conn| {
            WorkoutExercise::create(
                conn,
                &WorkoutExerciseCreate {
                    workout_id: 1,
                    exercise_id: 99,
                    sets: 1,
                    reps: 1,
                    weight_kg: 0.0,
                    distance_m: None,
                    time_min: None,
                },
            )
        });
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_planned_sets_must_be_in_range() {
        let db = test_database();
        db.with_conn(|conn| {
            let workout = Workout::create(
                conn,
                &WorkoutCreate {
                    name: "Volume".into(),
                    description: String::new(),
                    workout_type: WorkoutType::Strength,
                    is_wod: false,
                    scheduled_date: None,
                    created_by: None,
                },
            )?;
            let press = Exercise::create(
                conn,
                &ExerciseCreate {
                    name: "Press".into(),
                    category: String::new(),
                    kind: ExerciseKind::Strength,
                    notes: None,
                },
            )?;
            let data = |sets| WorkoutExerciseCreate {
                workout_id: workout.id,
                exercise_id: press.id,
                sets,
                reps: 5,
                weight_kg: 40.0,
                distance_m: None,
                time_min: None,
            };

            for sets in [0, 101, u32::MAX] {
                assert!(matches!(
                    WorkoutExercise::create(conn, &data(sets)),
                    Err(DbError::Invalid(_))
                ));
            }
            assert!(WorkoutExercise::list_planned(conn, workout.id)?.is_empty());

            let planned = WorkoutExercise::create(conn, &data(100))?;
            let too_many = WorkoutExercise::update(
                conn,
                planned.id,
                &WorkoutExerciseUpdate {
                    sets: Some(u32::MAX),
                    ..Default::default()
                },
            );
            assert!(matches!(too_many, Err(DbError::Invalid(_))));
            assert_eq!(WorkoutExercise::get_by_id(conn, planned.id)?.unwrap().sets, 100);
            Ok(())
        })
        .unwrap();
    }
}

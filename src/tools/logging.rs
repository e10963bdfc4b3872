//! Workout logging tools
//!
//! Starting a session (prefilled from the template), submitting it, and
//! reading back history and personal records.

use serde::Serialize;

use super::workouts::parse_unit;
use super::DeleteResponse;
use crate::db::Database;
use crate::models::{
    parse_timestamp, ExerciseScore, LoggedSession, Workout, WorkoutExercise, WorkoutLog,
    WorkoutLogCreate, WorkoutLogSummary,
};
use crate::scoring::{prefill_logs, ExerciseLog, MassUnit, PlannedExercise, SetEntry};

/// A set as entered by the user; weight is in the session's unit
#[derive(Debug, Clone, Default)]
pub struct SetInput {
    pub weight: Option<f64>,
    pub reps: u32,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ExerciseLogInput {
    pub exercise_id: i64,
    pub sets: Vec<SetInput>,
}

/// Prefilled logging sheet for a workout
#[derive(Debug, Serialize)]
pub struct StartLogResponse {
    pub workout_id: i64,
    pub workout_name: String,
    pub weight_unit: &'static str,
    pub exercises: Vec<LogSheetExercise>,
}

#[derive(Debug, Serialize)]
pub struct LogSheetExercise {
    pub exercise_id: i64,
    pub name: String,
    pub kind: String,
    pub sets: Vec<LogSheetSet>,
}

#[derive(Debug, Serialize)]
pub struct LogSheetSet {
    pub set_number: usize,
    pub weight: f64,
    pub reps: u32,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutLogDetail {
    pub id: i64,
    pub user_id: Option<i64>,
    pub workout_id: i64,
    pub workout_name: Option<String>,
    pub notes: String,
    pub score: f64,
    pub completed_at: String,
    pub sets: Vec<ExerciseScore>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: i64,
    pub workouts: Vec<WorkoutLogSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PersonalRecordLine {
    pub exercise_name: String,
    pub reps: u32,
    pub weight: f64,
    pub weight_unit: &'static str,
    pub weight_kg: f64,
    pub workout_log_id: i64,
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonalRecordsResponse {
    pub user_id: i64,
    pub records: Vec<PersonalRecordLine>,
}

fn sheet(planned: &[PlannedExercise], unit: MassUnit) -> Vec<LogSheetExercise> {
    planned
        .iter()
        .zip(prefill_logs(planned))
        .map(|(exercise, log)| LogSheetExercise {
            exercise_id: exercise.exercise_id,
            name: exercise.name.clone(),
            kind: exercise.kind.as_str().to_string(),
            sets: log
                .sets
                .iter()
                .enumerate()
                .map(|(i, set)| LogSheetSet {
                    set_number: i + 1,
                    weight: unit.from_kg(set.weight_kg.unwrap_or(0.0)),
                    reps: set.reps,
                    distance_m: set.distance_m,
                    time_min: set.time_min,
                })
                .collect(),
        })
        .collect()
}

/// Prefilled sets for a workout, the starting point of a logging session
pub fn start_log(
    db: &Database,
    workout_id: i64,
    weight_unit: Option<&str>,
) -> Result<StartLogResponse, String> {
    let unit = parse_unit(weight_unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workout = Workout::get_by_id(&conn, workout_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Workout not found with id: {}", workout_id))?;
    let planned = WorkoutExercise::list_planned(&conn, workout_id)
        .map_err(|e| format!("Failed to list workout exercises: {}", e))?;

    Ok(StartLogResponse {
        workout_id,
        workout_name: workout.name,
        weight_unit: unit.as_str(),
        exercises: sheet(&planned, unit),
    })
}

/// Convert user input to stored units
fn to_exercise_logs(logs: Vec<ExerciseLogInput>, unit: MassUnit) -> Vec<ExerciseLog> {
    logs.into_iter()
        .map(|log| ExerciseLog {
            exercise_id: log.exercise_id,
            sets: log
                .sets
                .into_iter()
                .map(|s| SetEntry {
                    weight_kg: s.weight.map(|w| unit.to_kg(w)),
                    reps: s.reps,
                    distance_m: s.distance_m,
                    time_min: s.time_min,
                })
                .collect(),
        })
        .collect()
}

/// Score and store a completed session
pub fn log_workout(
    db: &Database,
    user_id: i64,
    workout_id: i64,
    logs: Vec<ExerciseLogInput>,
    notes: Option<&str>,
    completed_at: Option<&str>,
    weight_unit: Option<&str>,
) -> Result<LoggedSession, String> {
    let unit = parse_unit(weight_unit)?;
    let completed_at = completed_at
        .map(|ts| {
            parse_timestamp(ts)
                .ok_or_else(|| format!("Invalid completed_at '{}', expected RFC 3339", ts))
        })
        .transpose()?;

    let data = WorkoutLogCreate {
        user_id,
        workout_id,
        notes: notes.unwrap_or_default().to_string(),
        logs: to_exercise_logs(logs, unit),
        completed_at,
    };

    db.with_conn_mut(|conn| WorkoutLog::log_session(conn, &data))
        .map_err(|e| format!("Failed to log workout: {}", e))
}

pub fn get_workout_log(db: &Database, id: i64) -> Result<Option<WorkoutLogDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let log = match WorkoutLog::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get workout log: {}", e))?
    {
        Some(log) => log,
        None => return Ok(None),
    };

    let workout_name = Workout::get_by_id(&conn, log.workout_id)
        .map_err(|e| format!("Failed to get workout: {}", e))?
        .map(|w| w.name);
    let sets = ExerciseScore::list_for_log(&conn, id)
        .map_err(|e| format!("Failed to list sets: {}", e))?;

    Ok(Some(WorkoutLogDetail {
        id: log.id,
        user_id: log.user_id,
        workout_id: log.workout_id,
        workout_name,
        notes: log.notes,
        score: log.score,
        completed_at: crate::models::format_timestamp(&log.completed_at),
        sets,
    }))
}

pub fn workout_history(
    db: &Database,
    user_id: i64,
    limit: Option<i64>,
) -> Result<HistoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workouts = WorkoutLog::history_for_user(&conn, user_id, limit)
        .map_err(|e| format!("Failed to get workout history: {}", e))?;

    let total = workouts.len();
    Ok(HistoryResponse {
        user_id,
        workouts,
        total,
    })
}

/// Edit the notes of a logged session; the score cannot be changed
pub fn update_log_notes(
    db: &Database,
    id: i64,
    notes: &str,
) -> Result<Option<WorkoutLogDetail>, String> {
    {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let updated = WorkoutLog::update_notes(&conn, id, notes)
            .map_err(|e| format!("Failed to update notes: {}", e))?;
        if updated.is_none() {
            return Ok(None);
        }
    }
    get_workout_log(db, id)
}

pub fn delete_workout_log(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = WorkoutLog::delete(&conn, id)
        .map_err(|e| format!("Failed to delete workout log: {}", e))?;
    if !deleted {
        return Err(format!("Workout log not found with id: {}", id));
    }
    tracing::info!(log_id = id, "workout log deleted");

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Heaviest sets of a user, shown in the requested unit
pub fn personal_records(
    db: &Database,
    user_id: i64,
    limit: Option<i64>,
    weight_unit: Option<&str>,
) -> Result<PersonalRecordsResponse, String> {
    let unit = parse_unit(weight_unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let records = ExerciseScore::personal_records(&conn, user_id, limit)
        .map_err(|e| format!("Failed to get personal records: {}", e))?
        .into_iter()
        .map(|r| PersonalRecordLine {
            exercise_name: r.exercise_name,
            reps: r.reps,
            weight: unit.from_kg(r.weight_kg),
            weight_unit: unit.as_str(),
            weight_kg: r.weight_kg,
            workout_log_id: r.workout_log_id,
            completed_at: r.completed_at.as_ref().map(crate::models::format_timestamp),
        })
        .collect();

    Ok(PersonalRecordsResponse { user_id, records })
}

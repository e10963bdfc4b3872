//! Workout template tools
//!
//! Authoring workouts and their planned exercises, and finding the Workout
//! of the Day. Weights may be entered in pounds or kilograms; they are
//! stored in kilograms.

use serde::Serialize;

use super::DeleteResponse;
use crate::db::Database;
use crate::models::{
    parse_date, Workout, WorkoutCreate, WorkoutExercise, WorkoutExerciseCreate,
    WorkoutExerciseUpdate, WorkoutType, WorkoutUpdate,
};
use crate::scoring::{MassUnit, PlannedExercise};

/// One planned exercise as entered by the author
#[derive(Debug, Clone)]
pub struct PlannedExerciseInput {
    pub exercise_id: i64,
    pub sets: u32,
    pub reps: u32,
    /// In `weight_unit`
    pub weight: f64,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

/// Planned exercise with its weight shown in the requested unit
#[derive(Debug, Serialize)]
pub struct PlannedExerciseDetail {
    #[serde(flatten)]
    pub planned: PlannedExercise,
    pub weight: f64,
    pub weight_unit: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub workout_type: String,
    pub workout_type_display: String,
    pub is_wod: bool,
    pub scheduled_date: String,
    pub created_by: Option<i64>,
    pub exercises: Vec<PlannedExerciseDetail>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct WorkoutSummary {
    pub id: i64,
    pub name: String,
    pub workout_type: String,
    pub is_wod: bool,
    pub scheduled_date: String,
}

#[derive(Debug, Serialize)]
pub struct ListWorkoutsResponse {
    pub workouts: Vec<WorkoutSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WodResponse {
    pub date: String,
    pub wod: Option<WorkoutDetail>,
    pub message: Option<String>,
}

pub(crate) fn parse_unit(unit: Option<&str>) -> Result<MassUnit, String> {
    match unit {
        Some(u) => MassUnit::from_str(u)
            .ok_or_else(|| format!("Invalid weight unit: '{}'. Valid units: kg, lbs", u)),
        None => Ok(MassUnit::default()),
    }
}

fn parse_workout_type(workout_type: &str) -> Result<WorkoutType, String> {
    WorkoutType::from_str(workout_type).ok_or_else(|| {
        format!(
            "Invalid workout type: '{}'. Valid types: strength, cardio, flexibility, hiit",
            workout_type
        )
    })
}

fn detail(
    conn: &rusqlite::Connection,
    workout: Workout,
    unit: MassUnit,
) -> Result<WorkoutDetail, String> {
    let planned = WorkoutExercise::list_planned(conn, workout.id)
        .map_err(|e| format!("Failed to list workout exercises: {}", e))?;

    let exercises = planned
        .into_iter()
        .map(|p| PlannedExerciseDetail {
            weight: unit.from_kg(p.weight_kg),
            weight_unit: unit.as_str(),
            planned: p,
        })
        .collect();

    Ok(WorkoutDetail {
        id: workout.id,
        name: workout.name,
        description: workout.description,
        workout_type: workout.workout_type.as_str().to_string(),
        workout_type_display: workout.workout_type.display_name().to_string(),
        is_wod: workout.is_wod,
        scheduled_date: workout.scheduled_date,
        created_by: workout.created_by,
        exercises,
        created_at: workout.created_at,
        updated_at: workout.updated_at,
    })
}

fn add_planned(
    conn: &rusqlite::Connection,
    workout_id: i64,
    input: &PlannedExerciseInput,
    unit: MassUnit,
) -> Result<WorkoutExercise, String> {
    let data = WorkoutExerciseCreate {
        workout_id,
        exercise_id: input.exercise_id,
        sets: input.sets,
        reps: input.reps,
        weight_kg: unit.to_kg(input.weight),
        distance_m: input.distance_m,
        time_min: input.time_min,
    };
    WorkoutExercise::create(conn, &data).map_err(|e| format!("Failed to add exercise: {}", e))
}

/// Create a workout with its planned exercises in one transaction
#[allow(clippy::too_many_arguments)]
pub fn create_workout(
    db: &Database,
    name: &str,
    description: Option<&str>,
    workout_type: Option<&str>,
    is_wod: bool,
    scheduled_date: Option<&str>,
    created_by: Option<i64>,
    exercises: Vec<PlannedExerciseInput>,
    weight_unit: Option<&str>,
) -> Result<WorkoutDetail, String> {
    let unit = parse_unit(weight_unit)?;
    let workout_type = workout_type
        .map(parse_workout_type)
        .transpose()?
        .unwrap_or_default();

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn
        .transaction()
        .map_err(|e| format!("Database error: {}", e))?;

    let data = WorkoutCreate {
        name: name.to_string(),
        description: description.unwrap_or_default().to_string(),
        workout_type,
        is_wod,
        scheduled_date: scheduled_date.map(String::from),
        created_by,
    };
    let workout = Workout::create(&tx, &data)
        .map_err(|e| format!("Failed to create workout: {}", e))?;

    for input in &exercises {
        add_planned(&tx, workout.id, input, unit)?;
    }

    let result = detail(&tx, workout, unit)?;
    tx.commit().map_err(|e| format!("Database error: {}", e))?;
    tracing::info!(workout_id = result.id, exercises = result.exercises.len(), "workout created");

    Ok(result)
}

pub fn get_workout(
    db: &Database,
    id: i64,
    weight_unit: Option<&str>,
) -> Result<Option<WorkoutDetail>, String> {
    let unit = parse_unit(weight_unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workout = Workout::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get workout: {}", e))?;

    workout.map(|w| detail(&conn, w, unit)).transpose()
}

pub fn list_workouts(
    db: &Database,
    wod_only: bool,
    limit: Option<i64>,
) -> Result<ListWorkoutsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workouts: Vec<WorkoutSummary> = Workout::list(&conn, wod_only, limit)
        .map_err(|e| format!("Failed to list workouts: {}", e))?
        .into_iter()
        .map(|w| WorkoutSummary {
            id: w.id,
            name: w.name,
            workout_type: w.workout_type.as_str().to_string(),
            is_wod: w.is_wod,
            scheduled_date: w.scheduled_date,
        })
        .collect();

    let total = workouts.len();
    Ok(ListWorkoutsResponse { workouts, total })
}

/// Workout of the Day for `date` (today when omitted)
pub fn get_wod(
    db: &Database,
    date: Option<&str>,
    weight_unit: Option<&str>,
) -> Result<WodResponse, String> {
    let unit = parse_unit(weight_unit)?;
    let date = match date {
        Some(d) => parse_date(d).map_err(|e| e.to_string())?,
        None => chrono::Utc::now().date_naive(),
    }
    .format("%Y-%m-%d")
    .to_string();

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let wod = Workout::get_wod(&conn, &date).map_err(|e| format!("Failed to get WOD: {}", e))?;

    match wod {
        Some(w) => Ok(WodResponse {
            date,
            wod: Some(detail(&conn, w, unit)?),
            message: None,
        }),
        None => Ok(WodResponse {
            message: Some(format!("No workout of the day scheduled for {}", date)),
            date,
            wod: None,
        }),
    }
}

pub fn update_workout(
    db: &Database,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
    workout_type: Option<&str>,
    is_wod: Option<bool>,
    scheduled_date: Option<&str>,
) -> Result<Option<WorkoutDetail>, String> {
    let data = WorkoutUpdate {
        name: name.map(String::from),
        description: description.map(String::from),
        workout_type: workout_type.map(parse_workout_type).transpose()?,
        is_wod,
        scheduled_date: scheduled_date.map(String::from),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = Workout::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update workout: {}", e))?;

    updated
        .map(|w| detail(&conn, w, MassUnit::default()))
        .transpose()
}

/// Append a planned exercise to an existing workout
pub fn add_workout_exercise(
    db: &Database,
    workout_id: i64,
    input: PlannedExerciseInput,
    weight_unit: Option<&str>,
) -> Result<WorkoutDetail, String> {
    let unit = parse_unit(weight_unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workout = Workout::get_by_id(&conn, workout_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Workout not found with id: {}", workout_id))?;

    add_planned(&conn, workout_id, &input, unit)?;
    detail(&conn, workout, unit)
}

/// Change the prescription of one planned exercise
#[allow(clippy::too_many_arguments)]
pub fn update_workout_exercise(
    db: &Database,
    id: i64,
    sets: Option<u32>,
    reps: Option<u32>,
    weight: Option<f64>,
    distance_m: Option<f64>,
    time_min: Option<f64>,
    weight_unit: Option<&str>,
) -> Result<Option<WorkoutDetail>, String> {
    let unit = parse_unit(weight_unit)?;
    let data = WorkoutExerciseUpdate {
        sets,
        reps,
        weight_kg: weight.map(|w| unit.to_kg(w)),
        distance_m,
        time_min,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = match WorkoutExercise::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update workout exercise: {}", e))?
    {
        Some(we) => we,
        None => return Ok(None),
    };

    Workout::get_by_id(&conn, updated.workout_id)
        .map_err(|e| format!("Failed to get workout: {}", e))?
        .map(|w| detail(&conn, w, unit))
        .transpose()
}

pub fn remove_workout_exercise(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = WorkoutExercise::delete(&conn, id)
        .map_err(|e| format!("Failed to remove workout exercise: {}", e))?;
    if !deleted {
        return Err(format!("Workout exercise not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Delete a workout that has never been logged
pub fn delete_workout(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Workout::delete(&conn, id)
        .map_err(|e| format!("Failed to delete workout: {}", e))?;
    if !deleted {
        return Err(format!("Workout not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

//! Exercise catalogue tools

use serde::Serialize;

use super::DeleteResponse;
use crate::db::Database;
use crate::models::{Exercise, ExerciseCreate, ExerciseUpdate};
use crate::scoring::ExerciseKind;

#[derive(Debug, Serialize)]
pub struct ListExercisesResponse {
    pub exercises: Vec<Exercise>,
    pub total: usize,
}

fn parse_kind(kind: Option<&str>) -> Result<Option<ExerciseKind>, String> {
    kind.map(|k| {
        ExerciseKind::from_str(k)
            .ok_or_else(|| format!("Invalid exercise kind: '{}'. Valid kinds: strength, run", k))
    })
    .transpose()
}

pub fn add_exercise(
    db: &Database,
    name: &str,
    category: Option<&str>,
    kind: Option<&str>,
    notes: Option<&str>,
) -> Result<Exercise, String> {
    let kind = parse_kind(kind)?.unwrap_or_default();
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Exercise::get_by_name(&conn, name)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some()
    {
        return Err(format!("An exercise named '{}' already exists", name.trim()));
    }

    let data = ExerciseCreate {
        name: name.to_string(),
        category: category.unwrap_or_default().to_string(),
        kind,
        notes: notes.map(String::from),
    };

    Exercise::create(&conn, &data).map_err(|e| format!("Failed to create exercise: {}", e))
}

pub fn get_exercise(db: &Database, id: i64) -> Result<Option<Exercise>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Exercise::get_by_id(&conn, id).map_err(|e| format!("Failed to get exercise: {}", e))
}

pub fn list_exercises(db: &Database, category: Option<&str>) -> Result<ListExercisesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let exercises = Exercise::list(&conn, category)
        .map_err(|e| format!("Failed to list exercises: {}", e))?;

    let total = exercises.len();
    Ok(ListExercisesResponse { exercises, total })
}

pub fn update_exercise(
    db: &Database,
    id: i64,
    name: Option<&str>,
    category: Option<&str>,
    kind: Option<&str>,
    notes: Option<&str>,
) -> Result<Option<Exercise>, String> {
    let data = ExerciseUpdate {
        name: name.map(String::from),
        category: category.map(String::from),
        kind: parse_kind(kind)?,
        notes: notes.map(String::from),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Exercise::update(&conn, id, &data).map_err(|e| format!("Failed to update exercise: {}", e))
}

/// Delete an exercise (only allowed when no workout uses it)
pub fn delete_exercise(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Exercise::delete(&conn, id)
        .map_err(|e| format!("Failed to delete exercise: {}", e))?;
    if !deleted {
        return Err(format!("Exercise not found with id: {}", id));
    }

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

//! Workout model
//!
//! Workout templates: a named, typed collection of planned exercises,
//! optionally flagged as the Workout of the Day for its scheduled date.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    #[default]
    Strength,
    Cardio,
    Flexibility,
    Hiit,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "strength",
            WorkoutType::Cardio => "cardio",
            WorkoutType::Flexibility => "flexibility",
            WorkoutType::Hiit => "hiit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Some(WorkoutType::Strength),
            "cardio" => Some(WorkoutType::Cardio),
            "flexibility" | "mobility" => Some(WorkoutType::Flexibility),
            "hiit" => Some(WorkoutType::Hiit),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "Strength",
            WorkoutType::Cardio => "Cardio",
            WorkoutType::Flexibility => "Flexibility",
            WorkoutType::Hiit => "HIIT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub workout_type: WorkoutType,
    pub is_wod: bool,
    pub scheduled_date: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCreate {
    pub name: String,
    pub description: String,
    pub workout_type: WorkoutType,
    pub is_wod: bool,
    /// ISO date; defaults to today
    pub scheduled_date: Option<String>,
    pub created_by: Option<i64>,
}

/// Data for updating a workout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub workout_type: Option<WorkoutType>,
    pub is_wod: Option<bool>,
    pub scheduled_date: Option<String>,
}

/// Validate an ISO date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> DbResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| DbError::Invalid(format!("invalid date '{}', expected YYYY-MM-DD", date)))
}

impl Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let type_str: String = row.get("workout_type")?;
        let workout_type = WorkoutType::from_str(&type_str).unwrap_or_default();

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            workout_type,
            is_wod: row.get::<_, i32>("is_wod")? != 0,
            scheduled_date: row.get("scheduled_date")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &WorkoutCreate) -> DbResult<Self> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(DbError::Invalid("workout name is required".to_string()));
        }
        let scheduled_date = match data.scheduled_date.as_deref() {
            Some(d) => parse_date(d)?,
            None => chrono::Utc::now().date_naive(),
        };

        conn.execute(
            r#"
            INSERT INTO workouts (name, description, workout_type, is_wod, scheduled_date, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                name,
                data.description,
                data.workout_type.as_str(),
                data.is_wod as i32,
                scheduled_date.format("%Y-%m-%d").to_string(),
                data.created_by,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("workout {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(workout) => Ok(Some(workout)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List workouts, newest schedule first
    pub fn list(conn: &Connection, wod_only: bool, limit: Option<i64>) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM workouts");
        if wod_only {
            sql.push_str(" WHERE is_wod = 1");
        }
        sql.push_str(" ORDER BY scheduled_date DESC, id DESC");
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n.max(0)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let workouts = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(workouts)
    }

    /// The Workout of the Day for a date. When several are flagged the most
    /// recently created one wins.
    pub fn get_wod(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let date = parse_date(date)?.format("%Y-%m-%d").to_string();
        let mut stmt = conn.prepare(
            "SELECT * FROM workouts WHERE is_wod = 1 AND scheduled_date = ?1 ORDER BY id DESC LIMIT 1",
        )?;

        match stmt.query_row([date], Self::from_row) {
            Ok(workout) => Ok(Some(workout)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(conn: &Connection, id: i64, data: &WorkoutUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(DbError::Invalid("workout name cannot be blank".to_string()));
            }
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.trim().to_string()));
        }
        if let Some(ref description) = data.description {
            updates.push(format!("description = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(description.clone()));
        }
        if let Some(workout_type) = data.workout_type {
            updates.push(format!("workout_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(workout_type.as_str()));
        }
        if let Some(is_wod) = data.is_wod {
            updates.push(format!("is_wod = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(is_wod as i32));
        }
        if let Some(ref date) = data.scheduled_date {
            let date = parse_date(date)?;
            updates.push(format!("scheduled_date = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(date.format("%Y-%m-%d").to_string()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE workouts SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Number of completed sessions of this workout
    pub fn log_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM workout_logs WHERE workout_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a workout and its planned exercises. Refused once it has been logged.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let logs = Self::log_count(conn, id)?;
        if logs > 0 {
            return Err(DbError::Invalid(format!(
                "workout {} has {} logged session(s) and cannot be deleted",
                id, logs
            )));
        }
        // Planned exercises are deleted via CASCADE
        let rows = conn.execute("DELETE FROM workouts WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn template(name: &str, is_wod: bool, date: &str) -> WorkoutCreate {
        WorkoutCreate {
            name: name.to_string(),
            description: String::new(),
            workout_type: WorkoutType::Hiit,
            is_wod,
            scheduled_date: Some(date.to_string()),
            created_by: None,
        }
    }

    #[test]
    fn test_get_wod_for_date() {
        let db = test_database();
        db.with_conn(|conn| {
            Workout::create(conn, &template("Plain", false, "2025-03-14"))?;
            let wod = Workout::create(conn, &template("Murph", true, "2025-03-14"))?;
            Workout::create(conn, &template("Tomorrow", true, "2025-03-15"))?;

            let found = Workout::get_wod(conn, "2025-03-14")?.unwrap();
            assert_eq!(found.id, wod.id);
            assert_eq!(found.workout_type, WorkoutType::Hiit);
            assert!(Workout::get_wod(conn, "2025-03-13")?.is_none());

            assert_eq!(Workout::list(conn, true, None)?.len(), 2);
            assert_eq!(Workout::list(conn, false, Some(1))?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_invalid_date_rejected() {
        let db = test_database();
        let result = db.with_conn(|conn| Workout::create(conn, &template("Bad", false, "14/03/2025")));
        assert!(matches!(result, Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_update_workout() {
        let db = test_database();
        db.with_conn(|conn| {
            let w = Workout::create(conn, &template("Fran", false, "2025-03-14"))?;
            let updated = Workout::update(
                conn,
                w.id,
                &WorkoutUpdate {
                    is_wod: Some(true),
                    workout_type: Some(WorkoutType::Strength),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert!(updated.is_wod);
            assert_eq!(updated.workout_type, WorkoutType::Strength);
            assert!(Workout::delete(conn, w.id)?);
            Ok(())
        })
        .unwrap();
    }
}

//! Exercise model
//!
//! The exercise catalogue. `kind` selects the scoring formula; `category` is
//! only a grouping label.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::scoring::ExerciseKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub kind: ExerciseKind,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub name: String,
    pub category: String,
    pub kind: ExerciseKind,
    pub notes: Option<String>,
}

/// Data for updating an exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub kind: Option<ExerciseKind>,
    pub notes: Option<String>,
}

/// Read the `kind` column, rejecting values outside the enum
pub(crate) fn kind_from_column(row: &Row, column: &str) -> rusqlite::Result<ExerciseKind> {
    let raw: String = row.get(column)?;
    ExerciseKind::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown exercise kind '{}'", raw).into(),
        )
    })
}

impl Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            kind: kind_from_column(row, "kind")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(DbError::Invalid("exercise name is required".to_string()));
        }

        conn.execute(
            "INSERT INTO exercises (name, category, kind, notes) VALUES (?1, ?2, ?3, ?4)",
            params![name, data.category.trim(), data.kind.as_str(), data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("exercise {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE name = ?1 COLLATE NOCASE")?;

        match stmt.query_row([name.trim()], Self::from_row) {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection, category: Option<&str>) -> DbResult<Vec<Self>> {
        let exercises = match category {
            Some(cat) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM exercises WHERE category = ?1 COLLATE NOCASE ORDER BY name",
                )?;
                let rows = stmt
                    .query_map([cat], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM exercises ORDER BY name")?;
                let rows = stmt
                    .query_map([], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(exercises)
    }

    pub fn update(conn: &Connection, id: i64, data: &ExerciseUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(DbError::Invalid("exercise name cannot be blank".to_string()));
            }
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.trim().to_string()));
        }
        if let Some(ref category) = data.category {
            updates.push(format!("category = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category.trim().to_string()));
        }
        if let Some(kind) = data.kind {
            updates.push(format!("kind = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(kind.as_str()));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE exercises SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Number of workout templates that prescribe this exercise
    pub fn usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM workout_exercises WHERE exercise_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete an exercise that no workout uses
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let used_by = Self::usage_count(conn, id)?;
        if used_by > 0 {
            return Err(DbError::Invalid(format!(
                "exercise {} is used by {} workout exercise(s)",
                id, used_by
            )));
        }
        let rows = conn.execute("DELETE FROM exercises WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn create(conn: &Connection, name: &str, category: &str, kind: ExerciseKind) -> Exercise {
        Exercise::create(
            conn,
            &ExerciseCreate {
                name: name.to_string(),
                category: category.to_string(),
                kind,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let db = test_database();
        db.with_conn(|conn| {
            let run = create(conn, "Run", "cardio", ExerciseKind::Run);
            create(conn, "Back Squat", "legs", ExerciseKind::Strength);

            let found = Exercise::get_by_name(conn, "run")?.unwrap();
            assert_eq!(found.id, run.id);
            assert_eq!(found.kind, ExerciseKind::Run);

            assert_eq!(Exercise::list(conn, None)?.len(), 2);
            assert_eq!(Exercise::list(conn, Some("LEGS"))?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_blank_name_rejected() {
        let db = test_database();
        let result = db.with_conn(|conn| {
            Exercise::create(
                conn,
                &ExerciseCreate {
                    name: "  ".to_string(),
                    category: String::new(),
                    kind: ExerciseKind::Strength,
                    notes: None,
                },
            )
        });
        assert!(matches!(result, Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_update_kind() {
        let db = test_database();
        db.with_conn(|conn| {
            let ex = create(conn, "Row", "cardio", ExerciseKind::Strength);
            let updated = Exercise::update(
                conn,
                ex.id,
                &ExerciseUpdate {
                    kind: Some(ExerciseKind::Run),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(updated.kind, ExerciseKind::Run);
            assert!(Exercise::delete(conn, ex.id)?);
            Ok(())
        })
        .unwrap();
    }
}

//! Profile model
//!
//! One row per user. The leaderboard shows `profile_name` when set and
//! falls back to first and last name.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::scoring::ProfileRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileCreate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial update. `Some("")` clears a text field, `None` leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

/// Blank strings are stored as NULL
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            profile_name: row.get("profile_name")?,
            email: row.get("email")?,
            age: row.get("age")?,
            gender: row.get("gender")?,
            avatar_url: row.get("avatar_url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ProfileCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (first_name, last_name, profile_name, email, age, gender, avatar_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                non_blank(data.first_name.as_deref()),
                non_blank(data.last_name.as_deref()),
                non_blank(data.profile_name.as_deref()),
                non_blank(data.email.as_deref()),
                data.age,
                non_blank(data.gender.as_deref()),
                non_blank(data.avatar_url.as_deref()),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("profile {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles ORDER BY id")?;
        let profiles = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    pub fn update(conn: &Connection, id: i64, data: &ProfileUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let text_fields = [
            ("first_name", &data.first_name),
            ("last_name", &data.last_name),
            ("profile_name", &data.profile_name),
            ("email", &data.email),
            ("gender", &data.gender),
            ("avatar_url", &data.avatar_url),
        ];
        for (column, value) in text_fields {
            if let Some(v) = value {
                updates.push(format!("{} = ?{}", column, params_vec.len() + 1));
                params_vec.push(Box::new(non_blank(Some(v.as_str()))));
            }
        }
        if let Some(age) = data.age {
            updates.push(format!("age = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(age));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE profiles SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Insert or overwrite the names of profile `id`
    pub fn upsert_names(
        conn: &Connection,
        id: i64,
        first_name: &str,
        last_name: &str,
        profile_name: Option<&str>,
    ) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (id, first_name, last_name, profile_name)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                profile_name = excluded.profile_name,
                updated_at = datetime('now')
            "#,
            params![
                id,
                non_blank(Some(first_name)),
                non_blank(Some(last_name)),
                non_blank(profile_name),
            ],
        )?;

        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("profile {}", id)))
    }

    /// Delete a profile. Its workout logs stay, with the user reference cleared.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM profiles WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn to_ref(&self) -> ProfileRef {
        ProfileRef {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_name: self.profile_name.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        self.to_ref()
            .display_name()
            .unwrap_or_else(|| format!("User #{}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_create_and_update_profile() {
        let db = test_database();
        db.with_conn(|conn| {
            let created = Profile::create(
                conn,
                &ProfileCreate {
                    first_name: Some("Ann".into()),
                    last_name: Some("Lee".into()),
                    profile_name: Some("".into()),
                    ..Default::default()
                },
            )?;
            assert_eq!(created.profile_name, None);
            assert_eq!(created.display_name(), "Ann Lee");

            let updated = Profile::update(
                conn,
                created.id,
                &ProfileUpdate {
                    profile_name: Some("annlifts".into()),
                    age: Some(31),
                    last_name: Some("".into()),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(updated.display_name(), "annlifts");
            assert_eq!(updated.age, Some(31));
            assert_eq!(updated.last_name, None);
            assert_eq!(updated.first_name.as_deref(), Some("Ann"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_upsert_names() {
        let db = test_database();
        db.with_conn(|conn| {
            Profile::upsert_names(conn, 1, "Sam", "Ortiz", None)?;
            let again = Profile::upsert_names(conn, 1, "Sam", "Ortiz", Some("sammy"))?;
            assert_eq!(again.display_name(), "sammy");
            assert_eq!(Profile::list(conn)?.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}

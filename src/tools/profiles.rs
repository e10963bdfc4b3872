//! Profile tools
//!
//! Create, read, update and delete user profiles (the settings screen).

use serde::Serialize;

use super::DeleteResponse;
use crate::db::Database;
use crate::models::{Profile, ProfileCreate, ProfileUpdate};

/// Profile as shown on the profile page
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub id: i64,
    pub display_name: String,
    pub full_name: Option<String>,
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Profile> for ProfileDetail {
    fn from(p: Profile) -> Self {
        let full_name = [p.first_name.as_deref(), p.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: p.id,
            display_name: p.display_name(),
            full_name: (!full_name.is_empty()).then_some(full_name),
            profile_name: p.profile_name,
            email: p.email,
            age: p.age,
            gender: p.gender,
            avatar_url: p.avatar_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListProfilesResponse {
    pub profiles: Vec<ProfileDetail>,
    pub total: usize,
}

fn validate_age(age: Option<i64>) -> Result<(), String> {
    match age {
        Some(a) if !(0..=150).contains(&a) => Err(format!("Invalid age: {}", a)),
        _ => Ok(()),
    }
}

pub fn create_profile(db: &Database, data: ProfileCreate) -> Result<ProfileDetail, String> {
    validate_age(data.age)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::create(&conn, &data)
        .map_err(|e| format!("Failed to create profile: {}", e))?;
    tracing::info!(profile_id = profile.id, "profile created");

    Ok(profile.into())
}

pub fn get_profile(db: &Database, id: i64) -> Result<Option<ProfileDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    Ok(profile.map(ProfileDetail::from))
}

pub fn list_profiles(db: &Database) -> Result<ListProfilesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profiles: Vec<ProfileDetail> = Profile::list(&conn)
        .map_err(|e| format!("Failed to list profiles: {}", e))?
        .into_iter()
        .map(ProfileDetail::from)
        .collect();

    let total = profiles.len();
    Ok(ListProfilesResponse { profiles, total })
}

pub fn update_profile(
    db: &Database,
    id: i64,
    data: ProfileUpdate,
) -> Result<Option<ProfileDetail>, String> {
    validate_age(data.age)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Profile::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    Ok(updated.map(ProfileDetail::from))
}

/// Delete a profile. Logged sessions are kept but no longer ranked.
pub fn delete_profile(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Profile::delete(&conn, id)
        .map_err(|e| format!("Failed to delete profile: {}", e))?;
    if !deleted {
        return Err(format!("Profile not found with id: {}", id));
    }
    tracing::info!(profile_id = id, "profile deleted");

    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

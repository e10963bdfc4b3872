//! Wodlog MCP Server Implementation
//!
//! Exposes the workout, logging and leaderboard tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{ProfileCreate, ProfileUpdate};
use crate::tools::logging::{ExerciseLogInput, SetInput};
use crate::tools::status::StatusTracker;
use crate::tools::workouts::PlannedExerciseInput;
use crate::tools::{exercises, leaderboard, logging, profiles, units, workouts};

/// Wodlog MCP Service
#[derive(Clone)]
pub struct WodlogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<WodlogService>,
}

impl WodlogService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        what, id
    ))]))
}

fn tool_error(e: String) -> McpError {
    McpError::internal_error(e, None)
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateProfileParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Handle shown on the leaderboard
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub id: i64,
    /// Empty string clears the field
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

// ============================================================================
// Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddExerciseParams {
    pub name: String,
    /// Free-form grouping, e.g. "legs" or "cardio"
    pub category: Option<String>,
    /// "strength" (default) or "run"
    pub kind: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListExercisesParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateExerciseParams {
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Workout Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlannedExerciseParams {
    pub exercise_id: i64,
    /// 1 to 100
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    /// Prescribed weight in `weight_unit`
    #[serde(default)]
    pub weight: f64,
    /// Run distance in meters
    pub distance_m: Option<f64>,
    /// Run time in minutes
    pub time_min: Option<f64>,
}

fn default_sets() -> u32 { 1 }

impl From<PlannedExerciseParams> for PlannedExerciseInput {
    fn from(p: PlannedExerciseParams) -> Self {
        Self {
            exercise_id: p.exercise_id,
            sets: p.sets,
            reps: p.reps,
            weight: p.weight,
            distance_m: p.distance_m,
            time_min: p.time_min,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateWorkoutParams {
    pub name: String,
    pub description: Option<String>,
    /// strength, cardio, flexibility or hiit
    pub workout_type: Option<String>,
    #[serde(default)]
    pub is_wod: bool,
    /// YYYY-MM-DD, defaults to today
    pub scheduled_date: Option<String>,
    /// Profile ID of the author
    pub created_by: Option<i64>,
    #[serde(default)]
    pub exercises: Vec<PlannedExerciseParams>,
    /// "kg" or "lbs" (default)
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetWorkoutParams {
    pub id: i64,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListWorkoutsParams {
    #[serde(default)]
    pub wod_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetWodParams {
    /// YYYY-MM-DD, defaults to today (UTC)
    pub date: Option<String>,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWorkoutParams {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub workout_type: Option<String>,
    pub is_wod: Option<bool>,
    pub scheduled_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWorkoutExerciseParams {
    pub workout_id: i64,
    #[serde(flatten)]
    pub exercise: PlannedExerciseParams,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWorkoutExerciseParams {
    /// workout_exercise_id
    pub id: i64,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
    pub weight_unit: Option<String>,
}

// ============================================================================
// Logging Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartLogParams {
    pub workout_id: i64,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetParams {
    /// In `weight_unit`
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: u32,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExerciseLogParams {
    pub exercise_id: i64,
    #[serde(default)]
    pub sets: Vec<SetParams>,
}

impl From<ExerciseLogParams> for ExerciseLogInput {
    fn from(p: ExerciseLogParams) -> Self {
        Self {
            exercise_id: p.exercise_id,
            sets: p
                .sets
                .into_iter()
                .map(|s| SetInput {
                    weight: s.weight,
                    reps: s.reps,
                    distance_m: s.distance_m,
                    time_min: s.time_min,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWorkoutParams {
    pub user_id: i64,
    pub workout_id: i64,
    /// One entry per planned exercise, in workout order
    pub logs: Vec<ExerciseLogParams>,
    pub notes: Option<String>,
    /// RFC 3339, defaults to now
    pub completed_at: Option<String>,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WorkoutHistoryParams {
    pub user_id: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateLogNotesParams {
    pub id: i64,
    pub notes: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PersonalRecordsParams {
    pub user_id: i64,
    pub limit: Option<i64>,
    pub weight_unit: Option<String>,
}

// ============================================================================
// Leaderboard Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DailyLeaderboardParams {
    /// YYYY-MM-DD, defaults to today (UTC)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LeaderboardParams {
    /// YYYY-MM-DD or RFC 3339
    pub start: String,
    /// YYYY-MM-DD (whole day included) or RFC 3339
    pub end: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertWeightParams {
    pub value: f64,
    /// "kg" or "lbs" (default)
    pub from_unit: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl WodlogService {
    // --- Status ---

    #[tool(description = "Get the current status of the wodlog service including build info, database status, and process information")]
    async fn wodlog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get step-by-step instructions for planning and logging workouts and reading the leaderboard. Call this when unsure how scoring or units work.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Profiles ---

    #[tool(description = "Create a user profile")]
    fn create_profile(&self, Parameters(p): Parameters<CreateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileCreate {
            first_name: p.first_name, last_name: p.last_name, profile_name: p.profile_name,
            email: p.email, age: p.age, gender: p.gender, avatar_url: p.avatar_url,
        };
        let result = profiles::create_profile(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a profile with its leaderboard display name")]
    fn get_profile(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        match profiles::get_profile(&self.database, p.id).map_err(tool_error)? {
            Some(profile) => json_result(&profile),
            None => not_found("Profile", p.id),
        }
    }

    #[tool(description = "List all profiles")]
    fn list_profiles(&self) -> Result<CallToolResult, McpError> {
        json_result(&profiles::list_profiles(&self.database).map_err(tool_error)?)
    }

    #[tool(description = "Update a profile. Only provided fields change; an empty string clears a field.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileUpdate {
            first_name: p.first_name, last_name: p.last_name, profile_name: p.profile_name,
            email: p.email, age: p.age, gender: p.gender, avatar_url: p.avatar_url,
        };
        match profiles::update_profile(&self.database, p.id, data).map_err(tool_error)? {
            Some(profile) => json_result(&profile),
            None => not_found("Profile", p.id),
        }
    }

    #[tool(description = "Delete a profile. Its logged workouts are kept but no longer appear in rankings.")]
    fn delete_profile(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        json_result(&profiles::delete_profile(&self.database, p.id).map_err(tool_error)?)
    }

    // --- Exercises ---

    #[tool(description = "Add an exercise to the catalogue. kind is 'strength' (scored weight x reps) or 'run' (scored distance + pace bonus).")]
    fn add_exercise(&self, Parameters(p): Parameters<AddExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::add_exercise(
            &self.database, &p.name, p.category.as_deref(), p.kind.as_deref(), p.notes.as_deref(),
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get an exercise by ID")]
    fn get_exercise(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        match exercises::get_exercise(&self.database, p.id).map_err(tool_error)? {
            Some(exercise) => json_result(&exercise),
            None => not_found("Exercise", p.id),
        }
    }

    #[tool(description = "List exercises, optionally filtered by category")]
    fn list_exercises(&self, Parameters(p): Parameters<ListExercisesParams>) -> Result<CallToolResult, McpError> {
        json_result(&exercises::list_exercises(&self.database, p.category.as_deref()).map_err(tool_error)?)
    }

    #[tool(description = "Update an exercise")]
    fn update_exercise(&self, Parameters(p): Parameters<UpdateExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = exercises::update_exercise(
            &self.database, p.id, p.name.as_deref(), p.category.as_deref(), p.kind.as_deref(), p.notes.as_deref(),
        ).map_err(tool_error)?;
        match result {
            Some(exercise) => json_result(&exercise),
            None => not_found("Exercise", p.id),
        }
    }

    #[tool(description = "Delete an exercise (only allowed if no workout uses it)")]
    fn delete_exercise(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        json_result(&exercises::delete_exercise(&self.database, p.id).map_err(tool_error)?)
    }

    // --- Workouts ---

    #[tool(description = "Create a workout template with its planned exercises. Set is_wod and scheduled_date to make it the Workout of the Day.")]
    fn create_workout(&self, Parameters(p): Parameters<CreateWorkoutParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::create_workout(
            &self.database,
            &p.name,
            p.description.as_deref(),
            p.workout_type.as_deref(),
            p.is_wod,
            p.scheduled_date.as_deref(),
            p.created_by,
            p.exercises.into_iter().map(PlannedExerciseInput::from).collect(),
            p.weight_unit.as_deref(),
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a workout with its planned exercises")]
    fn get_workout(&self, Parameters(p): Parameters<GetWorkoutParams>) -> Result<CallToolResult, McpError> {
        match workouts::get_workout(&self.database, p.id, p.weight_unit.as_deref()).map_err(tool_error)? {
            Some(workout) => json_result(&workout),
            None => not_found("Workout", p.id),
        }
    }

    #[tool(description = "List workouts, most recently scheduled first")]
    fn list_workouts(&self, Parameters(p): Parameters<ListWorkoutsParams>) -> Result<CallToolResult, McpError> {
        json_result(&workouts::list_workouts(&self.database, p.wod_only, p.limit).map_err(tool_error)?)
    }

    #[tool(description = "Get the Workout of the Day for a date (defaults to today)")]
    fn get_wod(&self, Parameters(p): Parameters<GetWodParams>) -> Result<CallToolResult, McpError> {
        json_result(&workouts::get_wod(&self.database, p.date.as_deref(), p.weight_unit.as_deref()).map_err(tool_error)?)
    }

    #[tool(description = "Update a workout's name, description, type, WOD flag or date")]
    fn update_workout(&self, Parameters(p): Parameters<UpdateWorkoutParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::update_workout(
            &self.database,
            p.id,
            p.name.as_deref(),
            p.description.as_deref(),
            p.workout_type.as_deref(),
            p.is_wod,
            p.scheduled_date.as_deref(),
        ).map_err(tool_error)?;
        match result {
            Some(workout) => json_result(&workout),
            None => not_found("Workout", p.id),
        }
    }

    #[tool(description = "Append a planned exercise to a workout")]
    fn add_workout_exercise(&self, Parameters(p): Parameters<AddWorkoutExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::add_workout_exercise(
            &self.database, p.workout_id, p.exercise.into(), p.weight_unit.as_deref(),
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Change the sets, reps, weight, distance or time of a planned exercise")]
    fn update_workout_exercise(&self, Parameters(p): Parameters<UpdateWorkoutExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::update_workout_exercise(
            &self.database, p.id, p.sets, p.reps, p.weight, p.distance_m, p.time_min, p.weight_unit.as_deref(),
        ).map_err(tool_error)?;
        match result {
            Some(workout) => json_result(&workout),
            None => not_found("Workout exercise", p.id),
        }
    }

    #[tool(description = "Remove a planned exercise from a workout by its workout_exercise_id")]
    fn remove_workout_exercise(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        json_result(&workouts::remove_workout_exercise(&self.database, p.id).map_err(tool_error)?)
    }

    #[tool(description = "Delete a workout (only allowed if nobody has logged it)")]
    fn delete_workout(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        json_result(&workouts::delete_workout(&self.database, p.id).map_err(tool_error)?)
    }

    // --- Logging ---

    #[tool(description = "Start logging a workout. Returns every planned exercise with sets prefilled from the template.")]
    fn start_log(&self, Parameters(p): Parameters<StartLogParams>) -> Result<CallToolResult, McpError> {
        json_result(&logging::start_log(&self.database, p.workout_id, p.weight_unit.as_deref()).map_err(tool_error)?)
    }

    #[tool(description = "Log a completed workout. logs must follow the workout's exercise order. The score is computed and stored once.")]
    fn log_workout(&self, Parameters(p): Parameters<LogWorkoutParams>) -> Result<CallToolResult, McpError> {
        let result = logging::log_workout(
            &self.database,
            p.user_id,
            p.workout_id,
            p.logs.into_iter().map(ExerciseLogInput::from).collect(),
            p.notes.as_deref(),
            p.completed_at.as_deref(),
            p.weight_unit.as_deref(),
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a logged workout with every recorded set")]
    fn get_workout_log(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        match logging::get_workout_log(&self.database, p.id).map_err(tool_error)? {
            Some(log) => json_result(&log),
            None => not_found("Workout log", p.id),
        }
    }

    #[tool(description = "Recent logged workouts of a user, newest first (default 20)")]
    fn workout_history(&self, Parameters(p): Parameters<WorkoutHistoryParams>) -> Result<CallToolResult, McpError> {
        json_result(&logging::workout_history(&self.database, p.user_id, p.limit).map_err(tool_error)?)
    }

    #[tool(description = "Edit the notes of a logged workout. The score cannot be changed.")]
    fn update_log_notes(&self, Parameters(p): Parameters<UpdateLogNotesParams>) -> Result<CallToolResult, McpError> {
        match logging::update_log_notes(&self.database, p.id, &p.notes).map_err(tool_error)? {
            Some(log) => json_result(&log),
            None => not_found("Workout log", p.id),
        }
    }

    #[tool(description = "Delete a logged workout and its sets")]
    fn delete_workout_log(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        json_result(&logging::delete_workout_log(&self.database, p.id).map_err(tool_error)?)
    }

    #[tool(description = "Heaviest strength sets of a user (default top 5)")]
    fn personal_records(&self, Parameters(p): Parameters<PersonalRecordsParams>) -> Result<CallToolResult, McpError> {
        let result = logging::personal_records(&self.database, p.user_id, p.limit, p.weight_unit.as_deref())
            .map_err(tool_error)?;
        json_result(&result)
    }

    // --- Leaderboard ---

    #[tool(description = "Rank users by total score for one UTC day (defaults to today). Top three get medals.")]
    fn daily_leaderboard(&self, Parameters(p): Parameters<DailyLeaderboardParams>) -> Result<CallToolResult, McpError> {
        json_result(&leaderboard::daily_leaderboard(&self.database, p.date.as_deref()).map_err(tool_error)?)
    }

    #[tool(description = "Rank users by total score over an inclusive window")]
    fn leaderboard(&self, Parameters(p): Parameters<LeaderboardParams>) -> Result<CallToolResult, McpError> {
        json_result(&leaderboard::leaderboard(&self.database, &p.start, &p.end).map_err(tool_error)?)
    }

    // --- Units ---

    #[tool(description = "Convert a weight between kg and lbs, rounded the way logged weights are")]
    fn convert_weight(&self, Parameters(p): Parameters<ConvertWeightParams>) -> Result<CallToolResult, McpError> {
        json_result(&units::convert_weight(p.value, p.from_unit.as_deref()).map_err(tool_error)?)
    }
}

#[tool_handler]
impl ServerHandler for WodlogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wodlog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Wodlog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Wodlog - workout logging and leaderboard. \
                 Call logging_instructions first if unsure how scoring or units work. \
                 Profiles: create/get/list/update/delete_profile. \
                 Exercises: add/get/list/update/delete_exercise. \
                 Workouts: create/get/list/update/delete_workout, add/update/remove_workout_exercise, get_wod. \
                 Logging: start_log then log_workout, get_workout_log, workout_history, update_log_notes, \
                 delete_workout_log, personal_records. \
                 Rankings: daily_leaderboard, leaderboard. \
                 Units: convert_weight (weights default to lbs)."
                    .into(),
            ),
        }
    }
}

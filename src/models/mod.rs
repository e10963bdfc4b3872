//! Data models
//!
//! Rust structs representing database entities.

mod exercise;
mod exercise_score;
mod profile;
mod workout;
mod workout_exercise;
mod workout_log;

pub use exercise::{Exercise, ExerciseCreate, ExerciseUpdate};
pub use exercise_score::{ExerciseScore, PersonalRecord, DEFAULT_RECORD_LIMIT};
pub use profile::{Profile, ProfileCreate, ProfileUpdate};
pub use workout::{parse_date, Workout, WorkoutCreate, WorkoutType, WorkoutUpdate};
pub use workout_exercise::{
    WorkoutExercise, WorkoutExerciseCreate, WorkoutExerciseUpdate, PLANNED_SETS_RANGE,
};
pub use workout_log::{
    format_timestamp, parse_timestamp, LoggedSession, WorkoutLog, WorkoutLogCreate,
    WorkoutLogSummary, DEFAULT_HISTORY_LIMIT,
};

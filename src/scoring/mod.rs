//! Scoring module
//!
//! Pure functions over already-fetched rows: unit conversion, workout
//! scoring and leaderboard aggregation. Nothing here touches the database.

pub mod leaderboard;
pub mod score;
pub mod units;

pub use leaderboard::{
    aggregate, rank_positions, LogRow, Medal, ProfileRef, RankedUser, TimeWindow, UserRanking,
};
pub use score::{
    exercise_score, prefill_logs, score_workout, workout_total, ExerciseKind, ExerciseLog,
    ExerciseScoreLine, PlannedExercise, SetEntry, WorkoutScore,
};
pub use units::{kg_to_lbs, lbs_to_kg, MassUnit, LBS_PER_KG};

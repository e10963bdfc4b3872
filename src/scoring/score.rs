//! Workout score calculator
//!
//! Each exercise kind has its own per-set formula:
//!
//! - **Strength**: `weight_kg × reps`
//! - **Run**: `distance_m + 1 / (time_min / 60)`, the time term only when a
//!   non-zero time was recorded
//!
//! An exercise scores the sum of its sets, a workout the sum of its exercises.

use serde::{Deserialize, Serialize};

/// How an exercise is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[default]
    Strength,
    Run,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Strength => "strength",
            ExerciseKind::Run => "run",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" | "weights" => Some(ExerciseKind::Strength),
            "run" | "running" => Some(ExerciseKind::Run),
            _ => None,
        }
    }

    /// Score of a single logged set
    pub fn set_score(&self, set: &SetEntry) -> f64 {
        match self {
            ExerciseKind::Strength => set.weight_kg.unwrap_or(0.0) * f64::from(set.reps),
            ExerciseKind::Run => {
                let distance = set.distance_m.unwrap_or(0.0);
                let speed = match set.time_min {
                    Some(t) if t != 0.0 => 1.0 / (t / 60.0),
                    _ => 0.0,
                };
                distance + speed
            }
        }
    }
}

/// One logged attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub distance_m: Option<f64>,
    #[serde(default)]
    pub time_min: Option<f64>,
}

impl SetEntry {
    pub fn strength(weight_kg: f64, reps: u32) -> Self {
        Self {
            weight_kg: Some(weight_kg),
            reps,
            ..Self::default()
        }
    }

    pub fn run(distance_m: f64, time_min: f64) -> Self {
        Self {
            distance_m: Some(distance_m),
            time_min: Some(time_min),
            ..Self::default()
        }
    }
}

/// Logged sets for one exercise in one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub exercise_id: i64,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

/// An exercise as prescribed by a workout template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub workout_exercise_id: i64,
    pub exercise_id: i64,
    pub name: String,
    pub kind: ExerciseKind,
    pub order_index: i32,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub distance_m: Option<f64>,
    pub time_min: Option<f64>,
}

impl PlannedExercise {
    /// The prescription as a set entry
    pub fn prescribed_set(&self) -> SetEntry {
        SetEntry {
            weight_kg: Some(self.weight_kg),
            reps: self.reps,
            distance_m: self.distance_m,
            time_min: self.time_min,
        }
    }
}

/// Per-exercise line of a scored workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseScoreLine {
    pub exercise_id: i64,
    pub name: String,
    pub kind: ExerciseKind,
    pub set_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutScore {
    pub total: f64,
    pub per_exercise: Vec<ExerciseScoreLine>,
}

/// Sum of set scores for one exercise
pub fn exercise_score(kind: ExerciseKind, sets: &[SetEntry]) -> f64 {
    sets.iter().map(|set| kind.set_score(set)).sum()
}

/// Pair logs with planned exercises by position.
///
/// A log only counts when the planned exercise at its position has the same
/// exercise id.
fn matched_pairs<'a>(
    planned: &'a [PlannedExercise],
    logs: &'a [ExerciseLog],
) -> impl Iterator<Item = (&'a PlannedExercise, &'a ExerciseLog)> {
    planned
        .iter()
        .zip(logs.iter())
        .filter(|(exercise, log)| exercise.exercise_id == log.exercise_id)
}

/// Total score of a workout session
pub fn workout_total(planned: &[PlannedExercise], logs: &[ExerciseLog]) -> f64 {
    matched_pairs(planned, logs)
        .map(|(exercise, log)| exercise_score(exercise.kind, &log.sets))
        .sum()
}

/// Total plus a line per planned exercise; unlogged exercises score zero
pub fn score_workout(planned: &[PlannedExercise], logs: &[ExerciseLog]) -> WorkoutScore {
    let per_exercise: Vec<ExerciseScoreLine> = planned
        .iter()
        .enumerate()
        .map(|(i, exercise)| {
            let sets = logs
                .get(i)
                .filter(|log| log.exercise_id == exercise.exercise_id)
                .map(|log| log.sets.as_slice())
                .unwrap_or(&[]);
            ExerciseScoreLine {
                exercise_id: exercise.exercise_id,
                name: exercise.name.clone(),
                kind: exercise.kind,
                set_count: sets.len(),
                score: exercise_score(exercise.kind, sets),
            }
        })
        .collect();

    WorkoutScore {
        total: workout_total(planned, logs),
        per_exercise,
    }
}

/// Starting logs for a session: every planned set filled with the prescription
pub fn prefill_logs(planned: &[PlannedExercise]) -> Vec<ExerciseLog> {
    planned
        .iter()
        .map(|exercise| ExerciseLog {
            exercise_id: exercise.exercise_id,
            sets: vec![exercise.prescribed_set(); exercise.sets as usize],
        })
        .collect()
}

//! Wodlog Status Tool
//!
//! Runtime status of the service, plus the usage guide handed to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Workout logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# Wodlog Workout Logging Instructions

This guide explains how to plan workouts, log them, and read the leaderboard.

## Overview

- **Exercises** - The catalogue. Each exercise is either `strength` or `run`.
- **Workouts** - Templates made of planned exercises (sets, reps, weight, or distance and time).
  A workout flagged `is_wod` with a `scheduled_date` is the Workout of the Day.
- **Workout logs** - A completed session by one profile, with every set recorded.
- **Leaderboard** - Profiles ranked by the summed score of their sessions in a time window.

---

## Scoring

Scores are computed once, when the session is logged, and never change afterwards.

| Exercise kind | Score per set |
|---------------|---------------|
| `strength` | weight (kg) x reps |
| `run` | distance (m) + 1 / (time_min / 60) |

- A run set without a time, or with a time of zero, scores only its distance.
- Missing weight counts as zero.
- Logged exercises are paired with the workout's planned exercises **by position**.
  An entry whose `exercise_id` does not match the planned exercise at the same
  position scores zero and is not stored (`ignored_logs` in the response).

---

## Weights and Units

Weights are stored in kilograms. Tools that take or return weights accept
`weight_unit` = `kg` or `lbs` (default `lbs`). Conversions round to whole numbers:

- 100 kg shows as 220 lbs
- 225 lbs is stored as 102 kg

Use `convert_weight` to check a conversion.

---

## Step-by-Step Workflow

### 1. Pick the workout

```
get_wod(date: "2026-01-14")
```

or browse with `list_workouts(wod_only: true)`.

### 2. Start the log

```
start_log(workout_id: 3, weight_unit: "lbs")
```

Returns every planned exercise with its sets prefilled from the template.
Edit the numbers to what was actually done.

### 3. Submit the session

```
log_workout(
  user_id: 1,
  workout_id: 3,
  weight_unit: "lbs",
  logs: [
    { exercise_id: 7, sets: [{ weight: 225, reps: 5 }, { weight: 185, reps: 8 }] },
    { exercise_id: 2, sets: [{ distance_m: 400, time_min: 2 }] }
  ],
  notes: "Felt strong"
)
```

Keep the `logs` in the same order as the exercises returned by `start_log`.

### 4. Check the standings

```
daily_leaderboard()                       // today, UTC
daily_leaderboard(date: "2026-01-14")
leaderboard(start: "2026-01-01", end: "2026-01-31")
```

Top three positions get gold, silver and bronze medals.

## Quick Reference

| Task | Tool |
|------|------|
| Manage profiles | `create_profile`, `get_profile`, `list_profiles`, `update_profile`, `delete_profile` |
| Manage exercises | `add_exercise`, `get_exercise`, `list_exercises`, `update_exercise`, `delete_exercise` |
| Manage workouts | `create_workout`, `get_workout`, `list_workouts`, `update_workout`, `delete_workout` |
| Edit a workout's exercises | `add_workout_exercise`, `update_workout_exercise`, `remove_workout_exercise` |
| Today's WOD | `get_wod` |
| Log a session | `start_log`, `log_workout` |
| Review sessions | `get_workout_log`, `workout_history`, `update_log_notes`, `delete_workout_log` |
| Heaviest lifts | `personal_records` |
| Rankings | `daily_leaderboard`, `leaderboard` |

## Notes

- Dates use ISO format: YYYY-MM-DD. Timestamps use RFC 3339.
- Days are UTC days.
- Deleting a profile keeps its sessions, but they no longer appear in rankings.
- Only notes can be edited on a logged session.
- A planned exercise has between 1 and 100 sets.
- An exercise used by a workout, or a workout with logged sessions, cannot be deleted.
"#;

/// Runtime status of the wodlog service
#[derive(Debug, Clone, Serialize)]
pub struct WodlogStatus {
    /// e.g. `wodlog 1.0.0+build.12`
    pub build_label: String,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self) -> WodlogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        WodlogStatus {
            build_label: build_info.to_string(),
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

//! Leaderboard tools

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::models::{parse_date, parse_timestamp, WorkoutLog};
use crate::scoring::{aggregate, rank_positions, RankedUser, TimeWindow};

pub const EMPTY_LEADERBOARD_MESSAGE: &str = "No rankings available yet";

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub window: TimeWindow,
    pub rankings: Vec<RankedUser>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn parse_day(date: &str) -> Result<NaiveDate, String> {
    parse_date(date).map_err(|e| e.to_string())
}

/// A bound is either an RFC 3339 timestamp or a date. A date as the end
/// bound covers the whole day.
fn parse_bound(value: &str, is_end: bool) -> Result<DateTime<Utc>, String> {
    if let Some(ts) = parse_timestamp(value) {
        return Ok(ts);
    }
    let window = TimeWindow::day(parse_day(value)?);
    Ok(if is_end { window.end } else { window.start })
}

fn rank_window(db: &Database, window: TimeWindow) -> Result<LeaderboardResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let rows = WorkoutLog::list_in_window(&conn, &window)
        .map_err(|e| format!("Failed to load workout logs: {}", e))?;
    let rankings = rank_positions(&aggregate(&rows, &window));

    tracing::debug!(rows = rows.len(), ranked = rankings.len(), "leaderboard computed");

    let total = rankings.len();
    Ok(LeaderboardResponse {
        window,
        message: rankings
            .is_empty()
            .then(|| EMPTY_LEADERBOARD_MESSAGE.to_string()),
        rankings,
        total,
    })
}

/// Rankings for one UTC day, today when no date is given
pub fn daily_leaderboard(db: &Database, date: Option<&str>) -> Result<LeaderboardResponse, String> {
    let window = match date {
        Some(d) => TimeWindow::day(parse_day(d)?),
        None => TimeWindow::today(),
    };
    rank_window(db, window)
}

/// Rankings over an arbitrary inclusive window
pub fn leaderboard(db: &Database, start: &str, end: &str) -> Result<LeaderboardResponse, String> {
    let start = parse_bound(start, false)?;
    let end = parse_bound(end, true)?;
    if end < start {
        return Err("End of the window is before its start".to_string());
    }
    rank_window(db, TimeWindow::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::ProfileCreate;
    use crate::scoring::Medal;
    use crate::tools::exercises::add_exercise;
    use crate::tools::logging::{log_workout, ExerciseLogInput, SetInput};
    use crate::tools::profiles::{create_profile, delete_profile};
    use crate::tools::workouts::{create_workout, PlannedExerciseInput};

    fn named(db: &Database, handle: &str) -> i64 {
        create_profile(
            db,
            ProfileCreate {
                profile_name: Some(handle.into()),
                ..Default::default()
            },
        )
        .unwrap()
        .id
    }

    fn lift(db: &Database, user: i64, workout: i64, exercise: i64, kg: f64, at: &str) {
        log_workout(
            db,
            user,
            workout,
            vec![ExerciseLogInput {
                exercise_id: exercise,
                sets: vec![SetInput {
                    weight: Some(kg),
                    reps: 1,
                    ..Default::default()
                }],
            }],
            None,
            Some(at),
            Some("kg"),
        )
        .unwrap();
    }

    fn squat_workout(db: &Database) -> (i64, i64) {
        let squat = add_exercise(db, "Back Squat", None, None, None).unwrap().id;
        let workout = create_workout(
            db,
            "Squat",
            None,
            None,
            false,
            None,
            None,
            vec![PlannedExerciseInput {
                exercise_id: squat,
                sets: 1,
                reps: 1,
                weight: 100.0,
                distance_m: None,
                time_min: None,
            }],
            Some("kg"),
        )
        .unwrap()
        .id;
        (workout, squat)
    }

    #[test]
    fn test_daily_ranking_with_medals() {
        let db = test_database();
        let (workout, squat) = squat_workout(&db);
        let ana = named(&db, "ana");
        let ben = named(&db, "ben");
        let cy = named(&db, "cy");

        lift(&db, ana, workout, squat, 100.0, "2025-03-14T08:00:00Z");
        lift(&db, ben, workout, squat, 150.0, "2025-03-14T09:00:00Z");
        lift(&db, ana, workout, squat, 80.0, "2025-03-14T18:00:00Z");
        lift(&db, cy, workout, squat, 500.0, "2025-03-15T00:00:00Z");

        let board = daily_leaderboard(&db, Some("2025-03-14")).unwrap();
        assert_eq!(board.total, 2);
        assert!(board.message.is_none());
        assert_eq!(board.rankings[0].ranking.display_name, "ana");
        assert_eq!(board.rankings[0].ranking.total_score, 180.0);
        assert_eq!(board.rankings[0].ranking.total_workouts, 2);
        assert_eq!(board.rankings[0].medal, Some(Medal::Gold));
        assert_eq!(board.rankings[1].medal, Some(Medal::Silver));

        let week = leaderboard(&db, "2025-03-14", "2025-03-15").unwrap();
        assert_eq!(week.rankings[0].ranking.display_name, "cy");
        assert_eq!(week.total, 3);
    }

    #[test]
    fn test_deleted_profile_drops_out() {
        let db = test_database();
        let (workout, squat) = squat_workout(&db);
        let ana = named(&db, "ana");
        lift(&db, ana, workout, squat, 100.0, "2025-03-14T08:00:00Z");
        delete_profile(&db, ana).unwrap();

        let board = daily_leaderboard(&db, Some("2025-03-14")).unwrap();
        assert!(board.rankings.is_empty());
        assert_eq!(board.message.as_deref(), Some(EMPTY_LEADERBOARD_MESSAGE));
    }

    #[test]
    fn test_invalid_windows() {
        let db = test_database();
        assert!(daily_leaderboard(&db, Some("14/03/2025")).is_err());
        assert!(leaderboard(&db, "2025-03-15", "2025-03-14").is_err());
        assert!(leaderboard(&db, "2025-03-14T00:00:00Z", "2025-03-14T12:00:00Z").is_ok());
    }
}

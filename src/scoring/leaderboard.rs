//! Leaderboard aggregation
//!
//! Turns flat workout-log rows into a ranked list of per-user totals for a
//! time window. Rows without a user reference are dropped, never fatal.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive timestamp range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Start of day through the last millisecond of the day (UTC)
    pub fn day(date: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let end = start + Duration::days(1) - Duration::milliseconds(1);
        Self { start, end }
    }

    pub fn today() -> Self {
        Self::day(Utc::now().date_naive())
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Profile columns joined onto a log row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_name: Option<String>,
}

impl ProfileRef {
    /// Handle when set, otherwise "first last"
    pub fn display_name(&self) -> Option<String> {
        if let Some(handle) = self.profile_name.as_deref().map(str::trim) {
            if !handle.is_empty() {
                return Some(handle.to_string());
            }
        }
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_string())
    }
}

/// One workout log as read for the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub user_id: Option<i64>,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
    pub profile: Option<ProfileRef>,
}

/// Per-user totals within a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRanking {
    pub user_id: i64,
    pub display_name: String,
    pub total_workouts: u32,
    pub total_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

/// A ranking with its 1-based position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedUser {
    pub rank: usize,
    pub medal: Option<Medal>,
    #[serde(flatten)]
    pub ranking: UserRanking,
}

/// Group rows by user inside `window` and rank by summed score.
///
/// Ties keep the order in which users first appear in `rows`.
pub fn aggregate(rows: &[LogRow], window: &TimeWindow) -> Vec<UserRanking> {
    let mut rankings: Vec<UserRanking> = Vec::new();
    let mut index_by_user: HashMap<i64, usize> = HashMap::new();
    let mut dropped = 0usize;

    for row in rows.iter().filter(|r| window.contains(&r.completed_at)) {
        let Some(user_id) = row.user_id else {
            dropped += 1;
            continue;
        };

        let idx = *index_by_user.entry(user_id).or_insert_with(|| {
            let display_name = row
                .profile
                .as_ref()
                .and_then(ProfileRef::display_name)
                .unwrap_or_else(|| format!("User #{}", user_id));
            rankings.push(UserRanking {
                user_id,
                display_name,
                total_workouts: 0,
                total_score: 0.0,
            });
            rankings.len() - 1
        });

        let entry = &mut rankings[idx];
        entry.total_workouts += 1;
        entry.total_score += row.score;
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped log rows without a user reference");
    }

    // sort_by is stable
    rankings.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    rankings
}

/// Attach positions and podium medals
pub fn rank_positions(rankings: &[UserRanking]) -> Vec<RankedUser> {
    rankings
        .iter()
        .enumerate()
        .map(|(i, ranking)| RankedUser {
            rank: i + 1,
            medal: match i {
                0 => Some(Medal::Gold),
                1 => Some(Medal::Silver),
                2 => Some(Medal::Bronze),
                _ => None,
            },
            ranking: ranking.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date().and_hms_opt(hour, 0, 0).unwrap())
    }

    fn row(user: Option<i64>, score: f64) -> LogRow {
        LogRow {
            user_id: user,
            score,
            completed_at: at(9),
            profile: user.map(|id| ProfileRef {
                id,
                first_name: Some(format!("First{}", id)),
                last_name: Some(format!("Last{}", id)),
                profile_name: None,
            }),
        }
    }

    #[test]
    fn test_groups_and_sorts_by_score() {
        let rows = vec![row(Some(1), 10.0), row(Some(1), 5.0), row(Some(2), 7.0)];
        let ranked = aggregate(&rows, &TimeWindow::day(date()));

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_id, 1);
        assert_eq!(ranked[0].total_workouts, 2);
        assert_eq!(ranked[0].total_score, 15.0);
        assert_eq!(ranked[1].user_id, 2);
        assert_eq!(ranked[1].total_workouts, 1);
        assert_eq!(ranked[1].total_score, 7.0);
    }

    #[test]
    fn test_empty_input_is_empty_ranking() {
        assert!(aggregate(&[], &TimeWindow::day(date())).is_empty());
    }

    #[test]
    fn test_missing_user_reference_is_dropped() {
        let rows = vec![row(None, 1000.0), row(Some(3), 1.0)];
        let ranked = aggregate(&rows, &TimeWindow::day(date()));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, 3);
        assert_eq!(ranked[0].total_score, 1.0);
    }

    #[test]
    fn test_only_missing_references_gives_empty_ranking() {
        let rows = vec![row(None, 5.0), row(None, 6.0)];
        assert!(aggregate(&rows, &TimeWindow::day(date())).is_empty());
    }

    #[test]
    fn test_rows_outside_window_are_ignored() {
        let mut late = row(Some(1), 50.0);
        late.completed_at = at(9) + Duration::days(1);
        let mut early = row(Some(2), 60.0);
        early.completed_at = at(0) - Duration::seconds(1);
        let rows = vec![late, early, row(Some(3), 1.0)];

        let ranked = aggregate(&rows, &TimeWindow::day(date()));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, 3);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = TimeWindow::day(date());
        assert!(window.contains(&window.start));
        assert!(window.contains(&window.end));
        assert!(!window.contains(&(window.end + Duration::milliseconds(1))));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![row(Some(5), 10.0), row(Some(4), 10.0), row(Some(6), 10.0)];
        let ranked = aggregate(&rows, &TimeWindow::day(date()));
        let order: Vec<i64> = ranked.iter().map(|r| r.user_id).collect();
        assert_eq!(order, vec![5, 4, 6]);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut handle = row(Some(1), 1.0);
        if let Some(p) = handle.profile.as_mut() {
            p.profile_name = Some("iron_ann".to_string());
        }
        let full_name = row(Some(2), 2.0);
        let mut bare = row(Some(3), 3.0);
        bare.profile = None;

        let ranked = aggregate(&[handle, full_name, bare], &TimeWindow::day(date()));
        assert_eq!(ranked[0].display_name, "User #3");
        assert_eq!(ranked[1].display_name, "First2 Last2");
        assert_eq!(ranked[2].display_name, "iron_ann");
    }

    #[test]
    fn test_blank_handle_falls_back_to_names() {
        let profile = ProfileRef {
            id: 1,
            first_name: Some("Ann".to_string()),
            last_name: None,
            profile_name: Some("  ".to_string()),
        };
        assert_eq!(profile.display_name().as_deref(), Some("Ann"));
    }

    #[test]
    fn test_rank_positions() {
        let rows: Vec<LogRow> = (1..=4).map(|id| row(Some(id), id as f64)).collect();
        let ranked = rank_positions(&aggregate(&rows, &TimeWindow::day(date())));

        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].ranking.user_id, 4);
        assert_eq!(ranked[0].medal, Some(Medal::Gold));
        assert_eq!(ranked[2].medal, Some(Medal::Bronze));
        assert_eq!(ranked[3].medal, None);
    }
}

//! Wodlog tools module
//!
//! Tool implementations behind the MCP server. Each takes the database and
//! plain arguments and returns a serializable response or an error message.

use serde::Serialize;

pub mod exercises;
pub mod leaderboard;
pub mod logging;
pub mod profiles;
pub mod status;
pub mod units;
pub mod workouts;

/// Response for successful deletions
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

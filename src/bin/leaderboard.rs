//! Print the daily leaderboard
//!
//! Usage: leaderboard [YYYY-MM-DD]

use wodlog::config::Config;
use wodlog::db::{migrations, Database};
use wodlog::scoring::Medal;
use wodlog::tools::leaderboard::daily_leaderboard;

fn medal_label(medal: Option<Medal>) -> &'static str {
    match medal {
        Some(Medal::Gold) => "gold",
        Some(Medal::Silver) => "silver",
        Some(Medal::Bronze) => "bronze",
        None => "",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = std::env::args().nth(1);

    let config = Config::from_env();
    config.ensure_data_dir()?;
    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    let board = daily_leaderboard(&database, date.as_deref())?;
    println!(
        "Leaderboard {} .. {}",
        board.window.start.format("%Y-%m-%d %H:%M"),
        board.window.end.format("%Y-%m-%d %H:%M")
    );

    if let Some(message) = &board.message {
        println!("{}", message);
        return Ok(());
    }

    for entry in &board.rankings {
        println!(
            "{:>3}. {:<24} {:>10.1} pts  {:>3} workouts  {}",
            entry.rank,
            entry.ranking.display_name,
            entry.ranking.total_score,
            entry.ranking.total_workouts,
            medal_label(entry.medal)
        );
    }

    Ok(())
}

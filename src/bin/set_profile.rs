//! Utility to set the local profile's names
//!
//! Usage: set_profile <first> <last> [profile_name]

use wodlog::config::Config;
use wodlog::db::{migrations, Database};
use wodlog::models::Profile;

const LOCAL_PROFILE_ID: i64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (first, last) = match (args.first(), args.get(1)) {
        (Some(first), Some(last)) => (first.as_str(), last.as_str()),
        _ => {
            eprintln!("Usage: set_profile <first> <last> [profile_name]");
            std::process::exit(2);
        }
    };
    let profile_name = args.get(2).map(String::as_str);

    let config = Config::from_env();
    config.ensure_data_dir()?;
    println!("Database path: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    database.with_conn(|conn| {
        let profile = Profile::upsert_names(conn, LOCAL_PROFILE_ID, first, last, profile_name)?;
        println!("Profile set:");
        println!("  ID: {}", profile.id);
        println!("  Display name: {}", profile.display_name());
        println!("  Updated: {}", profile.updated_at);
        Ok(())
    })?;

    Ok(())
}

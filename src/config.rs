//! Runtime configuration
//!
//! Everything is read from the environment:
//! - `WODLOG_DATABASE_PATH` - SQLite file (default `<project>/data/wodlog.db`)
//! - `RUST_LOG` - log filter, on top of the `wodlog=info` default

use std::path::{Path, PathBuf};

pub const DATABASE_PATH_ENV: &str = "WODLOG_DATABASE_PATH";
pub const DEFAULT_LOG_DIRECTIVE: &str = "wodlog=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());
        Self { database_path }
    }

    /// Create the parent directory of the database file if needed
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        match self.database_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

/// `data/wodlog.db` next to the project root when running from `target/{debug,release}`,
/// otherwise next to the executable.
fn default_database_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    project_root(&exe_dir).join("data").join("wodlog.db")
}

fn project_root(exe_dir: &Path) -> PathBuf {
    if exe_dir.ends_with("release") || exe_dir.ends_with("debug") {
        if let Some(root) = exe_dir.parent().and_then(Path::parent) {
            return root.to_path_buf();
        }
    }
    exe_dir.to_path_buf()
}

//! Build metadata
//!
//! `build.rs` exports a build counter and a compile timestamp. Both are
//! optional at compile time so `cargo build` without the script's env still
//! works; missing values show up as build 0 and "unknown".

use std::fmt;

use serde::Serialize;

pub const BUILD_NUMBER: u64 = match option_env!("WODLOG_BUILD_NUMBER") {
    Some(s) => match parse_build_number(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

pub const BUILD_TIMESTAMP: &str = match option_env!("WODLOG_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Decimal digits only; empty input and overflow are rejected.
/// Written by hand because `str::parse` is not const.
const fn parse_build_number(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if !digit.is_ascii_digit() {
            return None;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((digit - b'0') as u64) {
                Some(v) => v,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(value)
}

/// What the status tool and the banner report about this binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            description: DESCRIPTION,
        }
    }

    /// Built without the counter from `build.rs`
    pub fn is_untracked(&self) -> bool {
        self.build_number == 0
    }

    /// Banner lines, framed to the width of the longest line
    pub fn banner(&self) -> Vec<String> {
        let body = [
            format!("{} - workout log & leaderboard", self.name),
            format!("Version: {} | Build: {}", self.version, self.build_number),
            format!("Compiled: {}", self.build_timestamp),
        ];
        let width = body.iter().map(String::len).max().unwrap_or(0) + 4;
        let rule = "=".repeat(width);

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(rule.clone());
        lines.extend(body.iter().map(|line| format!("  {}", line)));
        lines.push(rule);
        lines
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_untracked() {
            write!(f, "{} {}", self.name, self.version)
        } else {
            write!(f, "{} {}+build.{}", self.name, self.version, self.build_number)
        }
    }
}

/// Print the startup banner to stderr; stdout carries the MCP transport
pub fn print_startup_banner() {
    for line in BuildInfo::current().banner() {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(build_number: u64) -> BuildInfo {
        BuildInfo {
            name: "wodlog",
            version: "1.0.0",
            build_number,
            build_timestamp: "2026-01-14T08:00:00Z",
            description: "",
        }
    }

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number("42"), Some(42));
        assert_eq!(parse_build_number("0"), Some(0));
        assert_eq!(parse_build_number(""), None);
        assert_eq!(parse_build_number("4a"), None);
        assert_eq!(parse_build_number("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_build_number("18446744073709551616"), None);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(info(12).to_string(), "wodlog 1.0.0+build.12");
        assert_eq!(info(0).to_string(), "wodlog 1.0.0");
    }

    #[test]
    fn test_banner_is_framed() {
        let lines = info(7).banner();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], lines[4]);
        assert!(lines[0].chars().all(|c| c == '='));
        assert!(lines.iter().skip(1).take(3).all(|l| l.len() <= lines[0].len()));
        assert!(lines[2].contains("Build: 7"));
    }
}

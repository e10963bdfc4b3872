//! Wodlog Library
//!
//! Workout templates, session logging, scoring and leaderboards.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod scoring;
pub mod tools;

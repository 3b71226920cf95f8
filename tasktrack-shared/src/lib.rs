//! # TaskTrack Shared Library
//!
//! Core logic of the TaskTrack backend: credentials and sessions, per-user
//! category provisioning, task listing and mutation, and dashboard statistics.
//! The HTTP server in `tasktrack-api` is a thin layer over these services.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, session tokens, register/login
//! - `db`: PostgreSQL pool and migrations
//! - `error`: service error taxonomy
//! - `models`: users, categories, tasks, subtasks
//! - `query`: listing parameters and filter builder
//! - `services`: category, task, and stats operations
//! - `store`: persistence traits with PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
pub mod store;

/// Current version of the TaskTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

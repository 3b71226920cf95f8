/// API route handlers, organized by resource
///
/// - `health`: store reachability
/// - `auth`: register and login
/// - `tasks`: task CRUD, listing, and dashboard stats
/// - `categories`: per-user categories

pub mod auth;
pub mod categories;
pub mod health;
pub mod tasks;

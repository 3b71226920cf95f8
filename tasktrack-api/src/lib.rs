//! # TaskTrack API Server Library
//!
//! HTTP boundary over the services in `tasktrack_shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router, and JWT layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

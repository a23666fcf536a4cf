//! Persistence layer for the PackTrack backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//!
//! SQL migrations live in `src/migrations` and are embedded by the API
//! binary via `sqlx::migrate!`.

pub mod db;
pub mod entities;
pub mod repositories;

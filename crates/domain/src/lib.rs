//! Domain layer for the PackTrack backend.
//!
//! This crate contains:
//! - Domain models (Task, TaskEvent, Attendance, AgentLocation, User)
//! - Business logic services (assignment validation, geofence checks)
//! - Domain error types

pub mod models;
pub mod services;

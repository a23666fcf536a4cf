//! Domain models for PackTrack.

pub mod agent_location;
pub mod attendance;
pub mod audit_log;
pub mod task;
pub mod task_event;
pub mod user;

pub use agent_location::{AgentCurrentLocation, LocationPing};
pub use attendance::{Attendance, LocationType};
pub use audit_log::{AuditAction, AuditLog, AuditOutcome, CreateAuditLogInput};
pub use task::{Task, TaskStatus};
pub use task_event::{EventType, TaskEvent};
pub use user::{User, UserRole};

//! Entity definitions (database row mappings).

pub mod agent_location;
pub mod attendance;
pub mod audit_log;
pub mod task;
pub mod task_event;
pub mod user;

pub use agent_location::{AgentCurrentLocationEntity, AgentLocationHistoryEntity};
pub use attendance::AttendanceEntity;
pub use audit_log::AuditLogEntity;
pub use task::TaskEntity;
pub use task_event::TaskEventEntity;
pub use user::UserEntity;

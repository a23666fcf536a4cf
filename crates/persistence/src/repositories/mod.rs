//! Repository implementations for database operations.

pub mod agent_location;
pub mod attendance;
pub mod audit_log;
pub mod task;
pub mod task_event;
pub mod user;

pub use agent_location::AgentLocationRepository;
pub use attendance::{AttendanceRepository, CreateAttendanceInput};
pub use audit_log::AuditLogRepository;
pub use task::{CreateTaskInput, TaskListFilter, TaskRepository};
pub use task_event::TaskEventRepository;
pub use user::{CreateUserInput, UserRepository};

//! Domain services for PackTrack.
//!
//! Services contain business logic that operates on domain models.

pub mod assignment;
pub mod audit;
pub mod geofence;
pub mod pack_code;

pub use assignment::{validate_assignment, AssignmentError, AssignmentOk, HISTORY_TAIL_MINUTES};
pub use audit::AuditLogBuilder;
pub use geofence::{evaluate_geofence, GeofenceCheck};

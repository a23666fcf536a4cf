//! Audit log domain models.
//!
//! Audit rows are append-only and never mutated; they are the system's
//! tamper record. Security-relevant rejections (wrong assignee, bad socket
//! auth) are always written here in addition to being rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

use super::user::UserRole;

/// Audited actions, format: resource.operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AuthLogin,
    AuthLoginFailed,
    AuthRefresh,
    TaskCreate,
    TaskStatusChange,
    EventRecord,
    AttendanceRecord,
    LocationUpdate,
    AssignmentDenied,
    SocketAuthFailed,
    UserCreate,
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth.login" => Ok(AuditAction::AuthLogin),
            "auth.login_failed" => Ok(AuditAction::AuthLoginFailed),
            "auth.refresh" => Ok(AuditAction::AuthRefresh),
            "task.create" => Ok(AuditAction::TaskCreate),
            "task.status_change" => Ok(AuditAction::TaskStatusChange),
            "task.event_record" => Ok(AuditAction::EventRecord),
            "task.attendance_record" => Ok(AuditAction::AttendanceRecord),
            "task.location_update" => Ok(AuditAction::LocationUpdate),
            "task.assignment_denied" => Ok(AuditAction::AssignmentDenied),
            "tracking.socket_auth_failed" => Ok(AuditAction::SocketAuthFailed),
            "user.create" => Ok(AuditAction::UserCreate),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::AuthLogin => "auth.login",
            AuditAction::AuthLoginFailed => "auth.login_failed",
            AuditAction::AuthRefresh => "auth.refresh",
            AuditAction::TaskCreate => "task.create",
            AuditAction::TaskStatusChange => "task.status_change",
            AuditAction::EventRecord => "task.event_record",
            AuditAction::AttendanceRecord => "task.attendance_record",
            AuditAction::LocationUpdate => "task.location_update",
            AuditAction::AssignmentDenied => "task.assignment_denied",
            AuditAction::SocketAuthFailed => "tracking.socket_auth_failed",
            AuditAction::UserCreate => "user.create",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of the audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Denied,
}

impl FromStr for AuditOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AuditOutcome::Success),
            "denied" => Ok(AuditOutcome::Denied),
            _ => Err(format!("Unknown audit outcome: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// A persisted audit log entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditLog {
    pub id: i64,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub outcome: AuditOutcome,
    pub detail: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLogInput {
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub outcome: AuditOutcome,
    pub detail: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub request_id: Option<String>,
}

/// Query parameters for listing audit logs (admin).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAuditLogsQuery {
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub outcome: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in [
            AuditAction::AuthLogin,
            AuditAction::AssignmentDenied,
            AuditAction::SocketAuthFailed,
            AuditAction::LocationUpdate,
        ] {
            assert_eq!(action.to_string().parse::<AuditAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_outcome_round_trip() {
        assert_eq!(
            "denied".parse::<AuditOutcome>().unwrap(),
            AuditOutcome::Denied
        );
        assert!("maybe".parse::<AuditOutcome>().is_err());
    }
}

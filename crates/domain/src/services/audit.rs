//! Audit log entry construction.
//!
//! Fluent builder over [`CreateAuditLogInput`] so route handlers and the
//! tracking gateway can assemble entries without naming every field.

use std::net::IpAddr;
use uuid::Uuid;

use crate::models::audit_log::{AuditAction, AuditOutcome, CreateAuditLogInput};
use crate::models::user::UserRole;

/// Builder for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
    actor_id: Option<Uuid>,
    actor_role: Option<UserRole>,
    action: AuditAction,
    resource_type: String,
    resource_id: Option<String>,
    outcome: AuditOutcome,
    detail: Option<String>,
    ip_address: Option<IpAddr>,
    request_id: Option<String>,
}

impl AuditLogBuilder {
    /// Entry for an action performed by a known user.
    pub fn user_action(user_id: Uuid, role: UserRole, action: AuditAction) -> Self {
        Self {
            actor_id: Some(user_id),
            actor_role: Some(role),
            action,
            resource_type: String::new(),
            resource_id: None,
            outcome: AuditOutcome::Success,
            detail: None,
            ip_address: None,
            request_id: None,
        }
    }

    /// Entry for an action with no authenticated actor (e.g. a failed
    /// login or a rejected socket handshake).
    pub fn anonymous_action(action: AuditAction) -> Self {
        Self {
            actor_id: None,
            actor_role: None,
            action,
            resource_type: String::new(),
            resource_id: None,
            outcome: AuditOutcome::Denied,
            detail: None,
            ip_address: None,
            request_id: None,
        }
    }

    /// Set the resource being acted upon.
    pub fn on_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = resource_type.into();
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Mark the entry as a denial with a human-readable reason.
    pub fn denied(mut self, detail: impl Into<String>) -> Self {
        self.outcome = AuditOutcome::Denied;
        self.detail = Some(detail.into());
        self
    }

    /// Attach a detail message without changing the outcome.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the client IP address.
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip_address = Some(ip);
        self
    }

    /// Set the request ID for tracing correlation.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Build the input for persistence.
    pub fn build(self) -> CreateAuditLogInput {
        CreateAuditLogInput {
            actor_id: self.actor_id,
            actor_role: self.actor_role,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            outcome: self.outcome,
            detail: self.detail,
            ip_address: self.ip_address,
            request_id: self.request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_action_defaults_to_success() {
        let input = AuditLogBuilder::user_action(
            Uuid::new_v4(),
            UserRole::Officer,
            AuditAction::EventRecord,
        )
        .on_resource("task", "abc")
        .build();

        assert_eq!(input.outcome, AuditOutcome::Success);
        assert_eq!(input.resource_type, "task");
        assert_eq!(input.resource_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_denied_sets_outcome_and_detail() {
        let input = AuditLogBuilder::user_action(
            Uuid::new_v4(),
            UserRole::Officer,
            AuditAction::AssignmentDenied,
        )
        .on_resource("task", "abc")
        .denied("not assigned")
        .build();

        assert_eq!(input.outcome, AuditOutcome::Denied);
        assert_eq!(input.detail.as_deref(), Some("not assigned"));
    }

    #[test]
    fn test_anonymous_action_has_no_actor() {
        let input = AuditLogBuilder::anonymous_action(AuditAction::SocketAuthFailed)
            .with_detail("bad token")
            .build();

        assert!(input.actor_id.is_none());
        assert!(input.actor_role.is_none());
        assert_eq!(input.outcome, AuditOutcome::Denied);
    }

    #[test]
    fn test_request_context_attached() {
        let ip: IpAddr = "10.1.2.3".parse().unwrap();
        let input = AuditLogBuilder::user_action(
            Uuid::new_v4(),
            UserRole::Admin,
            AuditAction::TaskCreate,
        )
        .with_ip(ip)
        .with_request_id("req-1")
        .build();

        assert_eq!(input.ip_address, Some(ip));
        assert_eq!(input.request_id.as_deref(), Some("req-1"));
    }
}

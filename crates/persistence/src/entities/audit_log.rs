//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::audit_log::{AuditAction, AuditLog, AuditOutcome};
use domain::models::user::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the audit_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: i64,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub outcome: String,
    pub detail: Option<String>,
    pub ip_address: Option<String>,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntity {
    pub fn into_model(self) -> Result<AuditLog, String> {
        let action: AuditAction = self.action.parse()?;
        let outcome: AuditOutcome = self.outcome.parse()?;
        let actor_role = match self.actor_role {
            Some(raw) => Some(raw.parse::<UserRole>()?),
            None => None,
        };
        let ip_address = match self.ip_address {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| format!("Invalid IP address in audit row: {}", raw))?,
            ),
            None => None,
        };
        Ok(AuditLog {
            id: self.id,
            actor_id: self.actor_id,
            actor_role,
            action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            outcome,
            detail: self.detail,
            ip_address,
            request_id: self.request_id,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_model_parses_enums_and_ip() {
        let entity = AuditLogEntity {
            id: 7,
            actor_id: Some(Uuid::new_v4()),
            actor_role: Some("officer".to_string()),
            action: "task.assignment_denied".to_string(),
            resource_type: "task".to_string(),
            resource_id: Some(Uuid::new_v4().to_string()),
            outcome: "denied".to_string(),
            detail: Some("not assigned".to_string()),
            ip_address: Some("192.168.1.20".to_string()),
            request_id: Some("req-9".to_string()),
            created_at: Utc::now(),
        };
        let log = entity.into_model().unwrap();
        assert_eq!(log.action, AuditAction::AssignmentDenied);
        assert_eq!(log.outcome, AuditOutcome::Denied);
        assert!(log.ip_address.unwrap().is_ipv4());
    }
}

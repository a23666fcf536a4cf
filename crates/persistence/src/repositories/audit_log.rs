//! Audit log repository for database operations.
//!
//! Only INSERT and SELECT are implemented; the table is the system's
//! append-only tamper record.

use domain::models::audit_log::{CreateAuditLogInput, ListAuditLogsQuery};
use sqlx::PgPool;

use crate::entities::AuditLogEntity;

const AUDIT_COLUMNS: &str = "id, actor_id, actor_role, action, resource_type, resource_id, \
     outcome, detail, ip_address, request_id, created_at";

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Repository for audit log operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an audit log entry.
    pub async fn insert(&self, input: &CreateAuditLogInput) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (actor_id, actor_role, action, resource_type, resource_id,
                                    outcome, detail, ip_address, request_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(input.actor_id)
        .bind(input.actor_role.map(|r| r.to_string()))
        .bind(input.action.to_string())
        .bind(&input.resource_type)
        .bind(&input.resource_id)
        .bind(input.outcome.to_string())
        .bind(&input.detail)
        .bind(input.ip_address.map(|ip| ip.to_string()))
        .bind(&input.request_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Lists audit log entries, newest first, with optional filters.
    pub async fn list(&self, query: &ListAuditLogsQuery) -> Result<Vec<AuditLogEntity>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param = 0;

        if query.actor_id.is_some() {
            param += 1;
            conditions.push(format!("actor_id = ${param}"));
        }
        if query.action.is_some() {
            param += 1;
            conditions.push(format!("action = ${param}"));
        }
        if query.outcome.is_some() {
            param += 1;
            conditions.push(format!("outcome = ${param}"));
        }
        if query.from.is_some() {
            param += 1;
            conditions.push(format!("created_at >= ${param}"));
        }
        if query.to.is_some() {
            param += 1;
            conditions.push(format!("created_at <= ${param}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let offset = query.offset.unwrap_or(0).max(0);

        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs {where_clause} \
             ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            param + 1,
            param + 2
        );

        let mut q = sqlx::query_as::<_, AuditLogEntity>(&sql);
        if let Some(actor_id) = query.actor_id {
            q = q.bind(actor_id);
        }
        if let Some(ref action) = query.action {
            q = q.bind(action);
        }
        if let Some(ref outcome) = query.outcome {
            q = q.bind(outcome);
        }
        if let Some(from) = query.from {
            q = q.bind(from);
        }
        if let Some(to) = query.to {
            q = q.bind(to);
        }
        q.bind(limit).bind(offset).fetch_all(&self.pool).await
    }
}

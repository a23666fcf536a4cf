//! Fire-and-forget audit log recording.
//!
//! Audit rows must never block or fail the request that produced them.
//! Inserts run on a spawned task; failures are logged and dropped. The
//! authoritative state lives in the domain tables.

use domain::models::audit_log::CreateAuditLogInput;
use persistence::repositories::AuditLogRepository;
use sqlx::PgPool;
use tracing::warn;

/// Spawns a background insert of the audit entry.
pub fn record(pool: &PgPool, input: CreateAuditLogInput) {
    let repo = AuditLogRepository::new(pool.clone());
    tokio::spawn(async move {
        if let Err(e) = repo.insert(&input).await {
            warn!(action = %input.action, error = %e, "Failed to write audit log entry");
        }
    });
}

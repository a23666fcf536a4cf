//! Best-effort webhook notifications for task transitions.
//!
//! Delivery is fire-and-forget: a down webhook endpoint must never fail
//! or slow a checkpoint submission. Failures are logged and dropped.

use domain::models::task::TaskStatus;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::NotificationConfig;

/// Payload POSTed to the configured webhook on every task transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskTransitionPayload {
    pub task_id: Uuid,
    pub pack_code: String,
    pub status: TaskStatus,
    pub detail: String,
}

/// Webhook notification sender.
#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    config: NotificationConfig,
}

impl NotificationService {
    pub fn new(config: NotificationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Whether notifications are configured and enabled.
    pub fn enabled(&self) -> bool {
        self.config.enabled && !self.config.webhook_url.is_empty()
    }

    /// Spawns a background delivery of the transition payload.
    ///
    /// Returns immediately; the caller's response never waits on the
    /// webhook endpoint.
    pub fn notify_task_transition(&self, payload: TaskTransitionPayload) {
        if !self.enabled() {
            return;
        }

        let client = self.client.clone();
        let url = self.config.webhook_url.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(task_id = %payload.task_id, status = %payload.status,
                        "Task transition webhook delivered");
                }
                Ok(resp) => {
                    warn!(task_id = %payload.task_id, status_code = %resp.status(),
                        "Task transition webhook rejected");
                }
                Err(e) => {
                    warn!(task_id = %payload.task_id, error = %e,
                        "Task transition webhook failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let service = NotificationService::new(NotificationConfig::default());
        assert!(!service.enabled());
    }

    #[test]
    fn test_enabled_requires_url() {
        let service = NotificationService::new(NotificationConfig {
            enabled: true,
            webhook_url: String::new(),
            timeout_ms: 100,
        });
        assert!(!service.enabled());
    }

    #[test]
    fn test_enabled_with_url() {
        let service = NotificationService::new(NotificationConfig {
            enabled: true,
            webhook_url: "http://localhost:9/webhook".to_string(),
            timeout_ms: 100,
        });
        assert!(service.enabled());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = TaskTransitionPayload {
            task_id: Uuid::new_v4(),
            pack_code: "PK-2024HSLC01".to_string(),
            status: TaskStatus::Completed,
            detail: "submission_at_post_office recorded".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("PK-2024HSLC01"));
    }
}

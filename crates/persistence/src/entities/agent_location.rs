//! Agent current-location entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::agent_location::AgentCurrentLocation;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the agent_current_locations table.
#[derive(Debug, Clone, FromRow)]
pub struct AgentCurrentLocationEntity {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Database row mapping for the append-only agent_location_history table.
#[derive(Debug, Clone, FromRow)]
pub struct AgentLocationHistoryEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl From<AgentCurrentLocationEntity> for AgentCurrentLocation {
    fn from(entity: AgentCurrentLocationEntity) -> Self {
        AgentCurrentLocation {
            user_id: entity.user_id,
            task_id: entity.task_id,
            latitude: entity.latitude,
            longitude: entity.longitude,
            accuracy: entity.accuracy,
            heading: entity.heading,
            speed: entity.speed,
            updated_at: entity.updated_at,
        }
    }
}

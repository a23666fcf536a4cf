//! Live tracking WebSocket gateway.
//!
//! Officers push location pings and admins watch tasks over a single
//! socket endpoint. Authentication happens before the upgrade via a JWT
//! in the query string (browser WebSocket clients cannot set an
//! Authorization header). Fan-out is one broadcast channel per task;
//! the database row remains the authoritative location, the channel is
//! only the low-latency path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use domain::models::agent_location::{AgentCurrentLocation, LocationPing};
use domain::models::audit_log::AuditAction;
use domain::models::user::UserRole;
use domain::services::assignment::{validate_assignment, AssignmentError};
use domain::services::audit::AuditLogBuilder;
use persistence::repositories::{AgentLocationRepository, TaskRepository};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_location_ping, record_tracking_subscriptions};
use crate::middleware::user_auth::UserAuth;
use crate::routes::client_ip;
use crate::services::audit;

/// Per-task broadcast rooms.
#[derive(Clone)]
pub struct TrackingState {
    rooms: Arc<DashMap<Uuid, broadcast::Sender<String>>>,
    capacity: usize,
}

impl TrackingState {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            capacity,
        }
    }

    /// Subscribes to a task's room, creating it on first use.
    pub fn subscribe(&self, task_id: Uuid) -> broadcast::Receiver<String> {
        self.rooms
            .entry(task_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publishes a payload to a task's room. A room with no subscribers
    /// is dropped so idle tasks do not accumulate channels.
    pub fn publish(&self, task_id: Uuid, payload: String) {
        if let Some(room) = self.rooms.get(&task_id) {
            if room.send(payload).is_err() {
                drop(room);
                self.rooms
                    .remove_if(&task_id, |_, tx| tx.receiver_count() == 0);
            }
        }
    }

    /// Total live subscriptions across all rooms.
    pub fn total_subscribers(&self) -> usize {
        self.rooms.iter().map(|r| r.receiver_count()).sum()
    }
}

/// Query parameters for the socket handshake.
#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub token: String,
}

/// Messages a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientMessage {
    #[serde(rename = "subscribe:task")]
    Subscribe { task_id: Uuid },

    #[serde(rename = "unsubscribe:task")]
    Unsubscribe { task_id: Uuid },

    #[serde(rename = "location:update")]
    LocationUpdate {
        task_id: Uuid,
        #[serde(flatten)]
        ping: LocationPing,
    },
}

/// Messages the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ServerMessage {
    #[serde(rename = "subscribed")]
    Subscribed {
        task_id: Uuid,
        /// The last known marker so subscribers render immediately
        /// instead of waiting for the next ping.
        current_location: Option<AgentCurrentLocation>,
    },

    #[serde(rename = "unsubscribed")]
    Unsubscribed { task_id: Uuid },

    #[serde(rename = "location:update")]
    Location {
        task_id: Uuid,
        location: AgentCurrentLocation,
    },

    #[serde(rename = "ack")]
    Ack { task_id: Uuid },

    #[serde(rename = "error")]
    Error { message: String },
}

/// GET /api/v1/tracking/ws?token=<jwt>
///
/// Rejects bad tokens with 401 before the upgrade completes; failed
/// handshakes are audited.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
) -> Response {
    match UserAuth::validate(&state.jwt, &query.token) {
        Ok(auth) => {
            info!(user_id = %auth.user_id, role = %auth.role, "Tracking socket authenticated");
            ws.on_upgrade(move |socket| handle_socket(socket, state, auth))
        }
        Err(e) => {
            debug!("Tracking socket auth failed: {}", e);

            let mut entry = AuditLogBuilder::anonymous_action(AuditAction::SocketAuthFailed)
                .on_resource("tracking", "ws")
                .with_detail(e);
            if let Some(ip) = client_ip(&headers) {
                entry = entry.with_ip(ip);
            }
            audit::record(&state.pool, entry.build());

            ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, auth: UserAuth) {
    let (mut sender, mut receiver) = socket.split();

    // All outbound traffic funnels through one channel so room forwarders
    // and direct replies share the single socket sink.
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    let send_task = tokio::spawn(async move {
        while let Some(payload) = out_rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session {
        state: state.clone(),
        auth,
        out_tx,
        forwarders: HashMap::new(),
        pinged_tasks: HashSet::new(),
    };

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                if session.handle_text(&text).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            // Axum answers pings itself; ignore everything else.
            _ => {}
        }
    }

    session.close();
    send_task.abort();
    record_tracking_subscriptions(state.tracking.total_subscribers());

    info!(user_id = %session.auth.user_id, "Tracking socket disconnected");
}

/// Per-connection state: active room forwarders and the outbound sink.
struct Session {
    state: AppState,
    auth: UserAuth,
    out_tx: mpsc::Sender<String>,
    forwarders: HashMap<Uuid, JoinHandle<()>>,
    pinged_tasks: HashSet<Uuid>,
}

impl Session {
    /// Handles one client frame. Err means the outbound channel is gone
    /// and the connection should close.
    async fn handle_text(&mut self, text: &str) -> Result<(), ()> {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                return self
                    .reply(ServerMessage::Error {
                        message: format!("Malformed message: {e}"),
                    })
                    .await;
            }
        };

        match message {
            ClientMessage::Subscribe { task_id } => self.subscribe(task_id).await,
            ClientMessage::Unsubscribe { task_id } => self.unsubscribe(task_id).await,
            ClientMessage::LocationUpdate { task_id, ping } => {
                self.location_update(task_id, ping).await
            }
        }
    }

    async fn subscribe(&mut self, task_id: Uuid) -> Result<(), ()> {
        if self.forwarders.contains_key(&task_id) {
            return self
                .reply(ServerMessage::Error {
                    message: "Already subscribed to this task".to_string(),
                })
                .await;
        }

        // Officers may only watch their own assignment.
        match self.authorize_watch(task_id).await {
            Ok(()) => {}
            Err(message) => return self.reply(ServerMessage::Error { message }).await,
        }

        // Queue the ack before the forwarder exists so no live ping can
        // reach the client ahead of its `subscribed` frame. The ack
        // carries the persisted marker, which covers any ping landing in
        // the gap before the room receiver is created.
        let repo = AgentLocationRepository::new(self.state.pool.clone());
        let current_location = match repo.find_by_task(task_id).await {
            Ok(entity) => entity.map(AgentCurrentLocation::from),
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Failed to load current location");
                None
            }
        };
        self.reply(ServerMessage::Subscribed {
            task_id,
            current_location,
        })
        .await?;

        let mut rx = self.state.tracking.subscribe(task_id);
        let out_tx = self.out_tx.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => {
                        if out_tx.send(payload).await.is_err() {
                            break;
                        }
                    }
                    // Lagged subscribers skip missed pings and continue
                    // from the live edge.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(task_id = %task_id, skipped, "Tracking subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.forwarders.insert(task_id, handle);
        record_tracking_subscriptions(self.state.tracking.total_subscribers());
        Ok(())
    }

    async fn unsubscribe(&mut self, task_id: Uuid) -> Result<(), ()> {
        if let Some(handle) = self.forwarders.remove(&task_id) {
            handle.abort();
            record_tracking_subscriptions(self.state.tracking.total_subscribers());
        }
        self.reply(ServerMessage::Unsubscribed { task_id }).await
    }

    async fn location_update(&mut self, task_id: Uuid, ping: LocationPing) -> Result<(), ()> {
        if self.auth.role != UserRole::Officer {
            return self
                .reply(ServerMessage::Error {
                    message: "Only officers publish locations".to_string(),
                })
                .await;
        }

        if let Err(e) = ping.validate() {
            return self
                .reply(ServerMessage::Error {
                    message: format!("Invalid ping: {e}"),
                })
                .await;
        }

        let task_repo = TaskRepository::new(self.state.pool.clone());
        let task = match task_repo.find_by_id(task_id).await {
            Ok(Some(entity)) => match entity.into_model() {
                Ok(task) => task,
                Err(e) => {
                    warn!(task_id = %task_id, error = %e, "Corrupt task row");
                    return self
                        .reply(ServerMessage::Error {
                            message: "Task unavailable".to_string(),
                        })
                        .await;
                }
            },
            Ok(None) => {
                return self
                    .reply(ServerMessage::Error {
                        message: "Task not found".to_string(),
                    })
                    .await;
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Task lookup failed");
                return self
                    .reply(ServerMessage::Error {
                        message: "Task unavailable".to_string(),
                    })
                    .await;
            }
        };

        let ok = match validate_assignment(&task, self.auth.user_id, Utc::now()) {
            Ok(ok) => ok,
            Err(e) => {
                if matches!(e, AssignmentError::NotAssigned) {
                    audit::record(
                        &self.state.pool,
                        AuditLogBuilder::user_action(
                            self.auth.user_id,
                            self.auth.role,
                            AuditAction::AssignmentDenied,
                        )
                        .on_resource("task", task_id.to_string())
                        .denied("location ping: caller is not the assigned officer")
                        .build(),
                    );
                }
                return self
                    .reply(ServerMessage::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        };

        let repo = AgentLocationRepository::new(self.state.pool.clone());
        let location = match repo.upsert(self.auth.user_id, task_id, &ping).await {
            Ok(entity) => AgentCurrentLocation::from(entity),
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Location upsert failed");
                return self
                    .reply(ServerMessage::Error {
                        message: "Failed to store location".to_string(),
                    })
                    .await;
            }
        };

        if ok.store_history {
            if let Err(e) = repo.append_history(self.auth.user_id, task_id, &ping).await {
                // History is the audit tail, the live marker already moved.
                warn!(task_id = %task_id, error = %e, "Location history append failed");
            }
        }

        record_location_ping("ws");

        // One audit row per task per socket session, not one per ping.
        if self.pinged_tasks.insert(task_id) {
            audit::record(
                &self.state.pool,
                AuditLogBuilder::user_action(
                    self.auth.user_id,
                    self.auth.role,
                    AuditAction::LocationUpdate,
                )
                .on_resource("task", task_id.to_string())
                .with_detail("live tracking started")
                .build(),
            );
        }

        if let Ok(payload) = serde_json::to_string(&ServerMessage::Location {
            task_id,
            location,
        }) {
            self.state.tracking.publish(task_id, payload);
        }

        self.reply(ServerMessage::Ack { task_id }).await
    }

    /// Watch authorization: admins watch anything, officers only their
    /// own assignment.
    async fn authorize_watch(&self, task_id: Uuid) -> Result<(), String> {
        if self.auth.role == UserRole::Admin {
            return Ok(());
        }

        let repo = TaskRepository::new(self.state.pool.clone());
        match repo.find_by_id(task_id).await {
            Ok(Some(entity)) => {
                if entity.assigned_user_id == self.auth.user_id {
                    Ok(())
                } else {
                    Err("Task not found".to_string())
                }
            }
            Ok(None) => Err("Task not found".to_string()),
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Task lookup failed");
                Err("Task unavailable".to_string())
            }
        }
    }

    async fn reply(&self, message: ServerMessage) -> Result<(), ()> {
        let payload = serde_json::to_string(&message).map_err(|_| ())?;
        self.out_tx.send(payload).await.map_err(|_| ())
    }

    fn close(&mut self) {
        for (_, handle) in self.forwarders.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_subscribe_parses() {
        let task_id = Uuid::new_v4();
        let json = format!(r#"{{"type":"subscribe:task","task_id":"{task_id}"}}"#);
        let message: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(message, ClientMessage::Subscribe { task_id: t } if t == task_id));
    }

    #[test]
    fn test_client_message_location_update_parses_flattened_ping() {
        let task_id = Uuid::new_v4();
        let json = format!(
            r#"{{"type":"location:update","task_id":"{task_id}","latitude":26.1445,"longitude":91.7362,"accuracy":5.0,"heading":null,"speed":null}}"#
        );
        let message: ClientMessage = serde_json::from_str(&json).unwrap();
        match message {
            ClientMessage::LocationUpdate { ping, .. } => {
                assert_eq!(ping.latitude, 26.1445);
                assert_eq!(ping.accuracy, Some(5.0));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_client_message_unknown_type_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"teleport","task_id":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_error_shape() {
        let json = serde_json::to_string(&ServerMessage::Error {
            message: "nope".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("nope"));
    }

    #[test]
    fn test_subscribe_creates_room_and_publish_reaches_it() {
        let state = TrackingState::new(8);
        let task_id = Uuid::new_v4();

        let mut rx = state.subscribe(task_id);
        state.publish(task_id, "ping".to_string());

        assert_eq!(rx.try_recv().unwrap(), "ping");
        assert_eq!(state.total_subscribers(), 1);
    }

    #[test]
    fn test_publish_to_unknown_room_is_noop() {
        let state = TrackingState::new(8);
        state.publish(Uuid::new_v4(), "ping".to_string());
        assert_eq!(state.total_subscribers(), 0);
    }

    #[test]
    fn test_dropped_subscriber_prunes_room() {
        let state = TrackingState::new(8);
        let task_id = Uuid::new_v4();

        let rx = state.subscribe(task_id);
        drop(rx);

        // First publish after the last receiver left removes the room.
        state.publish(task_id, "ping".to_string());
        assert!(state.rooms.get(&task_id).is_none());
    }
}

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use shared::jwt::JwtConfig;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{attendance, audit_logs, auth, health, task_events, tasks, users};
use crate::services::notification::NotificationService;
use crate::services::storage::{FilesystemPhotoStorage, PhotoStorage};
use crate::tracking::{self, TrackingState};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub storage: Arc<dyn PhotoStorage>,
    pub notifier: NotificationService,
    pub tracking: TrackingState,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    // Parse the signing keys once at startup rather than per request.
    let jwt = Arc::new(JwtConfig::with_leeway(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.access_token_expiry_secs,
        config.jwt.refresh_token_expiry_secs,
        config.jwt.leeway_secs,
    )?);

    // Create rate limiter if rate limiting is enabled (rate_limit_per_minute > 0)
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let storage: Arc<dyn PhotoStorage> = Arc::new(FilesystemPhotoStorage::new(&config.storage));
    let notifier = NotificationService::new(config.notification.clone());
    let tracking = TrackingState::new(config.tracking.room_capacity);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
        storage,
        notifier,
        tracking,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Officer routes (any authenticated user; officers see only their own
    // tasks, enforced in the handlers)
    // Middleware order: auth runs first, then rate limiting (which needs the auth info)
    let protected_routes = Router::new()
        .route("/api/v1/tasks", get(tasks::list_tasks))
        .route("/api/v1/tasks/:task_id", get(tasks::get_task))
        .route(
            "/api/v1/tasks/:task_id/events",
            post(task_events::record_event).get(task_events::list_events),
        )
        .route(
            "/api/v1/tasks/:task_id/attendance",
            post(attendance::mark_attendance).get(attendance::list_attendance),
        )
        .route(
            "/api/v1/tasks/:task_id/location",
            get(tasks::get_task_location),
        )
        .route(
            "/api/v1/tasks/:task_id/location/history",
            get(tasks::get_task_location_history),
        )
        // Photo submissions carry multipart bodies up to the configured cap
        .layer(DefaultBodyLimit::max(config.server.max_photo_size))
        // Rate limiting runs after auth (needs the user ID from auth)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Admin routes
    let admin_routes = Router::new()
        .route("/api/v1/tasks", post(tasks::create_task))
        .route(
            "/api/v1/tasks/:task_id/status",
            patch(tasks::update_task_status),
        )
        .route(
            "/api/v1/users",
            post(users::create_user).get(users::list_users),
        )
        .route("/api/v1/users/:user_id", get(users::get_user))
        .route("/api/v1/audit-logs", get(audit_logs::list_audit_logs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Public routes (no authentication required)
    // The tracking socket authenticates itself from the token query
    // parameter before upgrading.
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/tracking/ws", get(tracking::ws_handler));

    // Merge all routes
    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state);

    Ok(router)
}

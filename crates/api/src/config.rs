use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    /// Photo object storage configuration
    pub storage: StorageConfig,
    /// Live tracking gateway configuration
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Best-effort notification configuration
    #[serde(default)]
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for multipart photo uploads, in bytes.
    #[serde(default = "default_max_photo_size")]
    pub max_photo_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA private key in PEM format for signing tokens
    pub private_key: String,

    /// RSA public key in PEM format for verifying tokens
    pub public_key: String,

    /// Access token expiration in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds (default: 2592000 = 30 days)
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Photo storage configuration.
///
/// Photos are written under `root_dir` with hash-addressed names and
/// referenced by `public_base_url` in API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub root_dir: String,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Per-task broadcast channel capacity. Slow subscribers that lag
    /// behind this many messages miss intermediate pings.
    #[serde(default = "default_room_capacity")]
    pub room_capacity: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            room_capacity: default_room_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Whether to POST task transitions to the webhook URL.
    #[serde(default)]
    pub enabled: bool,

    /// Webhook endpoint receiving task transition payloads.
    #[serde(default)]
    pub webhook_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_notification_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            timeout_ms: default_notification_timeout_ms(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_photo_size() -> usize {
    10 * 1024 * 1024
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    100
}
fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}
fn default_refresh_token_expiry() -> i64 {
    2592000 // 30 days
}
fn default_jwt_leeway() -> u64 {
    30 // 30 seconds for clock skew tolerance
}
fn default_public_base_url() -> String {
    "http://localhost:8080/photos".to_string()
}
fn default_room_capacity() -> usize {
    64
}
fn default_notification_timeout_ms() -> u64 {
    5000
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PT").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Creates a config entirely from embedded defaults and overrides,
    /// without relying on config files.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_photo_size = 10485760

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 100

            [jwt]
            private_key = "test-private-key"
            public_key = "test-public-key"
            access_token_expiry_secs = 3600
            refresh_token_expiry_secs = 2592000
            leeway_secs = 30

            [storage]
            root_dir = "/tmp/packtrack-photos"
            public_base_url = "http://localhost:8080/photos"

            [tracking]
            room_capacity = 64

            [notification]
            enabled = false
            webhook_url = ""
            timeout_ms = 5000
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Skip validation to allow partial configs in tests
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.url".to_string(),
            ));
        }
        if self.jwt.private_key.is_empty() || self.jwt.public_key.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "jwt.private_key / jwt.public_key".to_string(),
            ));
        }
        if self.storage.root_dir.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.root_dir".to_string(),
            ));
        }
        if self.notification.enabled && self.notification.webhook_url.is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "notification.webhook_url required when notifications are enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// The socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid server host/port configuration")
    }

    /// The persistence-layer view of the database configuration.
    pub fn pool_settings(&self) -> persistence::db::PoolSettings {
        persistence::db::PoolSettings {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout: std::time::Duration::from_secs(self.database.connect_timeout_secs),
            idle_timeout: std::time::Duration::from_secs(self.database.idle_timeout_secs),
        }
    }
}

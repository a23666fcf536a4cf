//! Tracing subscriber initialization.
//!
//! Output format follows the `logging.format` setting: `json` for log
//! shipping in deployment, anything else gets the human-readable pretty
//! format for local work.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global tracing subscriber.
///
/// A `RUST_LOG` environment variable overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_target(true))
            .init();
    }
}

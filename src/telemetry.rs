//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Build the env filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match config.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.level.as_str(),
            "panic" | "fatal" => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},tower_http=info,sqlx=warn"))
    })
}

/// Install the global subscriber. JSON lines unless develop mode is on.
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = env_filter(config);

    if config.develop_mode {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    }

    tracing::info!(level = %config.level, develop_mode = config.develop_mode, "logger construction succeeded");
    Ok(())
}

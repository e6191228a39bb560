use tracing_subscriber::EnvFilter;

use crate::error::{OpsError, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init(log_level: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| {
            OpsError::Telemetry(format!("invalid log level/filter '{log_level}': {e}"))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(|e| OpsError::Telemetry(e.to_string()))
}

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// `RUST_LOG` if set, otherwise the given directives, or `info` when those
/// are blank.
pub fn env_filter(default_directives: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = match default_directives.trim() {
        "" => DEFAULT_LOG_LEVEL,
        directives => directives,
    };
    Ok(EnvFilter::try_new(directives)?)
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free for
/// the JSON result.
pub fn setup_telemetry(default_directives: &str) -> Result<(), TelemetryError> {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter(default_directives)?))
        .try_init()?;
    tracing::debug!(default_directives, "telemetry initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(
                env_filter("hospitality=loud"),
                Err(TelemetryError::Filter(_))
            ));
        }
    }

    #[test]
    fn blank_directives_fall_back_to_info() -> Result<(), TelemetryError> {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(
                env_filter("  ")?.max_level_hint(),
                Some(tracing_subscriber::filter::LevelFilter::INFO)
            );
        }
        Ok(())
    }

    #[test]
    fn second_setup_fails() {
        let first = setup_telemetry("info");
        let second = setup_telemetry("");
        // another test binary may have installed a subscriber first
        assert!(first.is_err() || matches!(second, Err(TelemetryError::Init(_))));
        tracing::info!("telemetry ready");
    }
}

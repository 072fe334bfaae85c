//! Logging setup.
//!
//! Library code only emits `tracing` events. Binaries and tests that want to
//! see them install a subscriber with [`init_tracing`].

use crate::config::FortConfig;
use crate::errors::{FortError, FortResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_filter`.
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_tracing(config: &FortConfig) -> FortResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| FortError::Config(format!("invalid log filter '{}': {e}", config.log_filter)))?,
    };

    let fmt = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    Registry::default()
        .with(filter)
        .with(fmt)
        .try_init()
        .map_err(|e| FortError::Config(format!("tracing subscriber already installed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = FortConfig {
            log_filter: "fortee=verbose".to_string(),
            ..FortConfig::default()
        };
        assert!(matches!(init_tracing(&config), Err(FortError::Config(_))));
    }

    #[test]
    fn test_second_install_fails() {
        let config = FortConfig::default();
        let first = init_tracing(&config);
        let second = init_tracing(&config);

        // Another test in this process may have installed the subscriber first.
        assert!(first.is_err() || second.is_err());
        assert!(matches!(second, Err(FortError::Config(ref msg)) if msg.contains("already installed")));
    }
}

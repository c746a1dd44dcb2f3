//! Subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::config::VerbosityConfig;

/// Environment variable that overrides the `-v` derived level.
pub const LOG_ENV: &str = "RUST_LOG";

/// Builds the event filter.
///
/// A non-empty, parseable `env_override` (the value of `RUST_LOG`) wins;
/// otherwise the level comes from `config`.
#[must_use]
pub fn build_filter(config: VerbosityConfig, env_override: Option<&str>) -> EnvFilter {
    env_override
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(config.directive()))
}

/// Installs a formatting subscriber writing to standard error.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_tracing(config: VerbosityConfig) -> bool {
    let env_override = std::env::var(LOG_ENV).ok();
    let filter = build_filter(config, env_override.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.shows_targets())
        .without_time()
        .try_init()
        .is_ok()
}

//! Tracing subscriber bootstrap for binaries and examples.

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Initialize the global `tracing` subscriber.
///
/// # Arguments
///
/// * `json_format` - Whether to emit JSON lines instead of the pretty format
/// * `log_level` - Default filter directive when `RUST_LOG` is unset
pub fn init_tracing(json_format: bool, log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = Registry::default().with(env_filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()
            .context("failed to initialize tracing subscriber")?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
            .context("failed to initialize tracing subscriber")?;
    }

    Ok(())
}

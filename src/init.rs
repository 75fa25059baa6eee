// Logging/tracing setup

use cwprune_config::{LogFormat, PrunerConfig};

/// Initialize tracing/logging from PrunerConfig
pub fn init_tracing(config: &PrunerConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Parse log level from config
    let env_filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries the report only
    let layer = fmt::layer().with_writer(std::io::stderr);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.log.format {
        LogFormat::Json => tracing::subscriber::set_global_default(registry.with(layer.json())),
        LogFormat::Text => tracing::subscriber::set_global_default(registry.with(layer)),
    };
}

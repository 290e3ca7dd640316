use tracing_subscriber::{
    EnvFilter, fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{Config, LogFormat};

/// Installs the global subscriber for the client process.
///
/// `RUST_LOG` wins over `config.log_level`; an unparsable level falls back
/// to the default directives. Fails if a global subscriber is already set,
/// so a host application keeps its own.
pub fn init_tracing(config: &Config) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(Config::default().log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        // one object per event, fields at top level
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().compact().with_target(false)).try_init(),
    }
}

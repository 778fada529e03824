//! Logging bootstrap.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` selects the filter (default `info`); `format` selects the
/// formatter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "REGROUP_LOG";

/// Filter used when `REGROUP_LOG` is unset
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

/// Send `tracing` events to stderr so stdout stays free for results
pub fn init_logger(verbosity: u8, use_color: bool) {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| default_filter(verbosity).to_string());
    let filter_layer = EnvFilter::new(filter);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(use_color),
        )
        .with(filter_layer)
        .init();
}

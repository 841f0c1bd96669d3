//! Structured logging initialization.
//!
//! Human-friendly output on an interactive stderr, JSON lines in robot mode.
//! `RUST_LOG` overrides the verbosity flags.

use std::io::{self, IsTerminal};

use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// * `json_mode` - structured JSON lines for machine consumption
/// * `verbose` - 0 = info, 1 = debug, 2+ = trace
/// * `quiet` - errors only
pub fn init_logging(json_mode: bool, verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "bannerkit=error"
    } else {
        match verbose {
            0 => "bannerkit=info",
            1 => "bannerkit=debug",
            _ => "bannerkit=trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    if json_mode {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stderr);
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .compact()
            .with_ansi(io::stderr().is_terminal())
            .with_target(false)
            .with_writer(io::stderr);
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }
}

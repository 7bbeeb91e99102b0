//! Diagnostic tracing for the simulator and compressor.
//!
//! Results (CSV rows, compressed programs) go to stdout; everything emitted
//! through `tracing` goes to stderr and is filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Per-tick scoring events are at
/// `trace`, compressor candidates at `debug`.
///
/// # Example
/// ```bash
/// RUST_LOG=dancebots::compress=debug dancebots compress FFFFlFFFFl
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

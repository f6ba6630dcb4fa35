//! Diagnostic tracing for the agents CLI.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The files a task
//! writes under the output directory are unaffected by it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`, so missing context documents and
/// missing response sections are reported out of the box.
///
/// # Example
/// ```bash
/// RUST_LOG=agents=debug agents run security "Review the login flow" --simulate
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

//! Diagnostic logging.
//!
//! Diagnostics go to stderr so they never interleave with the transcript on
//! stdout. The filter comes from `I2CSCRIPT_LOG` (same syntax as `RUST_LOG`)
//! and defaults to `info`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "I2CSCRIPT_LOG";

pub fn init_stderr_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

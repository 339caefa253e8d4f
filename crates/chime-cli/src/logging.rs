//! Log output for the CLI.
//!
//! Logs go to stderr so `chime run --json` keeps stdout clean. The filter is
//! read from `CHIME_LOG` (e.g. `CHIME_LOG=chime::trace=info` to print every
//! timer event), defaulting to warnings only.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_env("CHIME_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

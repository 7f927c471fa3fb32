//! Tracing initialization for the CLI.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `verbose`.
/// Stdout stays reserved for command output.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}

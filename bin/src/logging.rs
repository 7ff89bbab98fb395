//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v`/`-q`. Logs go
/// to stderr so bar output on stdout stays clean.
pub(crate) fn init(verbose: u8, quiet: bool, json: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (e.g. in tests); keep it.
    let _ = if json {
        builder.json().with_target(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

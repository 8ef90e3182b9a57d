//! Log output for the command-line tool

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber
///
/// `RUST_LOG` wins over `filter`; `verbose` raises the crate to debug level.
/// Calling this twice keeps the first subscriber.
pub fn init(filter: &str, verbose: bool) {
    let directive = if verbose { "hrdesk=debug" } else { filter };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

//! Process-wide log subscriber.
//!
//! Library crates log through the `log` facade; the subscriber's `log`
//! bridge forwards those records so `RUST_LOG` filters both.

use tracing_subscriber::EnvFilter;

use crate::CliError;

const DEFAULT_FILTER: &str = "info";

pub(crate) fn init_logging() -> Result<(), CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::InitLogging {
            message: err.to_string(),
        })
}

use tracing_subscriber::EnvFilter;

use crate::aideon::leads::error::{IngestError, Result};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a global subscriber writing human-readable events to stderr.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| IngestError::Logging(err.to_string()))
}

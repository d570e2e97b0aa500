pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,tally=info,tally_core=info";

/// Installs the global subscriber. `RUST_LOG` wins over `fallback`; an
/// unparsable directive falls back to the default filter. Logs go to stderr so
/// command output on stdout stays machine readable.
pub fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

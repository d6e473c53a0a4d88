//! Tracing subscriber setup.
//!
//! One fmt layer on stderr, filtered by `RUST_LOG` or a default that keeps
//! this crate at `info`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "bikeshare_board=info,tower_http=warn";

/// Initialize logging to stderr.
///
/// `RUST_LOG` overrides the default filter. Must be called once, before
/// any other tracing call.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

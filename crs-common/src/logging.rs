//! Tracing subscriber setup shared by every CRS binary

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_level` (normally the
/// `[logging] level` value from the TOML config) is used.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(false).init();
}

//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered by `RUST_LOG` when set.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, falling back to `default_filter`.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .with_current_span(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        init("debug");
        assert!(!init("debug"));
        ::tracing::info!(component = "observability", "subscriber installed");
    }
}

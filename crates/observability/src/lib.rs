//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide logging with the default filter (`info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Subscriber installation (filters, formatting).
pub mod tracing;

//! Process-wide tracing setup shared by SecureFile binaries and tests.

/// Initialize JSON tracing with `RUST_LOG`, falling back to `info`.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init() -> bool {
    tracing::init(tracing::DEFAULT_FILTER)
}

/// Like [`init`], with a caller-chosen fallback filter.
pub fn init_with_default(default_filter: &str) -> bool {
    tracing::init(default_filter)
}

/// Subscriber construction (filter, JSON layer).
pub mod tracing;

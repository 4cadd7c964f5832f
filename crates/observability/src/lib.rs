//! Process-wide tracing setup shared by the warehouse binaries.

/// Initialize tracing with `log_level` as the default filter.
///
/// `RUST_LOG` takes precedence when set. Safe to call more than once; later
/// calls are no-ops.
pub fn init(log_level: &str, json: bool) {
    tracing::init(log_level, json);
}

/// Subscriber construction (filters, formatting).
pub mod tracing;

//! Telemetry helpers for applications embedding `chart-lens`.
//!
//! The engine only emits `tracing` events: lifecycle transitions at `debug`,
//! hover transitions at `trace`, recovered domain errors at `warn`. Installing
//! a subscriber is left to the host; the helpers here serve demos and tools.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a compact subscriber filtered by `RUST_LOG`, or `DEFAULT_FILTER`.
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    let from_env = std::env::var("RUST_LOG").ok();
    init_tracing_with_filter(from_env.as_deref().unwrap_or(DEFAULT_FILTER))
}

/// Installs a compact subscriber for explicit filter directives such as
/// `"warn,chart_lens::api=debug"`. Unparsable directives fall back to
/// `DEFAULT_FILTER`.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}

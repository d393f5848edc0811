//! # Observability
//!
//! Structured logging for the whole engine, built on the `tracing` crate.
//! Store lifecycles, every refresh and settle, and every swallowed
//! fire-and-forget failure are logged with structured fields so production
//! issues (a table whose orders never refresh, a settle that never landed)
//! can be traced without a debugger.
//!
//! Levels follow one convention: `info` for lifecycle and confirmed state
//! changes, `warn` for degraded-but-recovered situations (failed refresh,
//! stale patch target, dropped settle notification), `debug` for payloads
//! and per-request detail.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle and state changes
//! RUST_LOG=debug cargo run     # full per-request detail
//! ```

/// Initialize the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

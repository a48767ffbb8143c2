//! # Tracing Setup
//!
//! Library code only emits events; the host installs a subscriber. What gets logged:
//!
//! | Level | Events |
//! |-------|--------|
//! | `info` | Services/clients opened and closed, plugin init, transport shutdown |
//! | `warn` | Rejected payloads, failed calls, rejected connections, unenforced options |
//! | `error` | Failed detached calls, fatal plugin init |
//! | `debug` | Registrations, bound patterns, outbound payloads |
//! | `trace` | `Executing <name> method` and timing ends |
//!
//! Every event on the request path carries the `correlation_id` field, so one request
//! can be followed from client to handler:
//!
//! ```bash
//! RUST_LOG=info cargo run      # Lifecycle only
//! RUST_LOG=debug cargo run     # Payloads
//! RUST_LOG=role_rpc=trace cargo run
//! ```

/// Initializes the tracing subscriber for a binary.
///
/// Filtering comes from `RUST_LOG`. Calling it twice panics, as with any global
/// subscriber; tests should not call it.
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_target(false)
        .init();
}

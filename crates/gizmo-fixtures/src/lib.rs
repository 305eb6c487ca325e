//! Test utilities and fixtures for gizmo integration tests.
//!
//! - [`FakeGraphServer`] - in-process WebSocket server answering envelopes
//! - [`ScriptedTransport`] - in-memory transport replaying canned frames
//! - [`frames`] - builders for response frames
//! - [`init_test_logging`] - route `tracing` output to the test harness
//!
//! # Example
//!
//! ```ignore
//! use gizmo::{Client, Query, WebSocketTransport};
//! use gizmo_fixtures::{frames, FakeGraphServer};
//!
//! let server = FakeGraphServer::start(|_envelope| {
//!     vec![frames::success(serde_json::json!([1]))]
//! })
//! .await;
//! let client = Client::new(WebSocketTransport::new(server.endpoint()));
//! let response = client.send(&Query::new("1")).await?;
//! ```

// Test fixtures crate - relaxed lints for test utilities
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]
#![allow(missing_docs)]

pub mod frames;
pub mod scripted;
pub mod server;

pub use scripted::{ScriptedChannel, ScriptedReply, ScriptedTransport};
pub use server::FakeGraphServer;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to `gizmo=debug`. Safe to call from every test.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gizmo=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

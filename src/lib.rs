//! Gateway brokering a payment processor and a generative-text provider.
//!
//! Two protocol-level responsibilities live here: verifying inbound payment
//! confirmations against a shared-secret HMAC signature and fanning the
//! verified event out to every live listener exactly once, and relaying
//! incrementally produced text generations to callers as live, cancellable
//! Server-Sent-Events streams.
//!
//! # Modules
//!
//! - [`signature`] — constant-time confirmation signature verification
//! - [`dispatcher`] — broadcast fan-out of verified payment events
//! - [`relay`] — per-request streaming session state machine
//! - [`providers`] — upstream payment and generation HTTP clients
//! - [`routes`] — HTTP endpoints (health, orders, verify, generate, events)
//! - [`config`] — environment-backed immutable configuration
//! - [`metrics`] — Prometheus metrics for gateway operations

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod relay;
pub mod routes;
pub mod signature;
pub mod sse;
pub mod state;

pub use config::GatewayConfig;
pub use dispatcher::{Dispatcher, PaymentVerifiedEvent};
pub use error::GatewayError;
pub use state::AppState;

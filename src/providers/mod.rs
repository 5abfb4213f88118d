//! Upstream provider clients.
//!
//! Both providers are reached over HTTP with a single attempt per call —
//! failures surface to the caller as [`GatewayError::Upstream`](crate::GatewayError),
//! no retry or backoff.

pub mod generation;
pub mod payment;

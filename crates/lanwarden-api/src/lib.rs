//! Async client for the lanwarden network-scanner backend.
//!
//! The backend is a cookie-authenticated JSON HTTP API: `/login` sets a
//! session cookie, every other endpoint requires it. This crate owns the
//! transport mechanics only — URL construction, credentialed requests,
//! response decoding — and exposes one method per backend endpoint.
//! Higher-level state (optimistic list updates, busy tracking) lives in
//! `lanwarden-core`.
//!
//! Response contract (see [`ApiClient`]):
//! - non-2xx → [`Error::Http`] carrying status, status text, and body
//! - 2xx with a non-JSON content type → `Ok(None)` ("no content" success)
//! - 2xx JSON → deserialized payload

mod auth;
mod client;
mod devices;
mod scans;

pub mod error;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{AckResponse, DeviceRecord, MeResponse, PlannedScanRecord};
pub use transport::{TlsMode, TransportConfig};

//! Domain logic for the lanwarden console.
//!
//! Sits between the wire client (`lanwarden-api`) and the user
//! interfaces. Owns the session gate, the two device collections, and
//! the scan schedule board, all exposed as `tokio::sync::watch`
//! channels so UIs re-render on change instead of polling.

pub mod busy;
pub mod devices;
pub mod error;
pub mod model;
pub mod schedule;
pub mod session;

pub use busy::{BusyKey, BusySet};
pub use devices::DeviceLists;
pub use error::CoreError;
pub use model::{Device, DeviceKey, MacAddress, PlannedScan, SessionState};
pub use schedule::ScheduleBoard;
pub use session::SessionGate;

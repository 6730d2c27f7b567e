//! Wire types for the scanner backend.
//!
//! Field names mirror the backend's JSON exactly (snake_case, SQLite
//! `"YYYY-MM-DD HH:MM:SS"` datetime strings). Parsing those strings into
//! real timestamps is `lanwarden-core`'s job — the wire layer stays dumb.

use serde::{Deserialize, Serialize};

/// One device row as returned by `/getApproved` and `/getUnapproved`,
/// and as sent to the add/update endpoints.
///
/// Identity is the `(mac_address, ip_address)` pair; everything else is
/// descriptive and optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac_address: String,
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// One planned-scan row from `/plannedScans/all` and `/plannedScans/due`.
///
/// `next_scan_at == None` means the schedule is paused. The backend keys
/// delete/lookup by `interval` alone — no server-side row id exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedScanRecord {
    pub interval: i64,
    pub scan_target: String,
    #[serde(default)]
    pub next_scan_at: Option<String>,
    #[serde(default)]
    pub last_scan_at: Option<String>,
}

/// Generic `{"ok": true}` acknowledgement most mutation endpoints return.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from the `/me` session probe.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub username: Option<String>,
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `(mac_address, ip_address)` selector for the remove endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct DeviceKeyBody<'a> {
    pub mac_address: &'a str,
    pub ip_address: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartScanBody<'a> {
    pub scan_target: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlanScanBody<'a> {
    pub interval: i64,
    pub scan_target: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScanTargetBody<'a> {
    pub scan_target: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletePlannedBody {
    pub interval: i64,
}

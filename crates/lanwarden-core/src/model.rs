// ── Domain model ──
//
// Typed views over the backend's wire records. The wire layer keeps raw
// strings; everything here is normalized and parsed.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use lanwarden_api::{DeviceRecord, PlannedScanRecord};

use crate::error::CoreError;

/// Datetime format the backend's SQLite layer emits.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a backend timestamp string. Unparseable values resolve to
/// `None` rather than failing the whole row.
pub fn parse_backend_datetime(value: Option<&str>) -> Option<NaiveDateTime> {
    let raw = value?;
    match NaiveDateTime::parse_from_str(raw, SQLITE_DATETIME_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::warn!(raw, error = %e, "unparseable backend timestamp");
            None
        }
    }
}

/// Render a timestamp back into the backend's wire format.
pub fn format_backend_datetime(value: NaiveDateTime) -> String {
    value.format(SQLITE_DATETIME_FORMAT).to_string()
}

// ── MAC address ─────────────────────────────────────────────────────

/// A MAC address, normalized to lowercase colon-separated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize. Accepts `:` or `-` separators and any case;
    /// requires exactly six hex octets.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let octets: Vec<&str> = raw.trim().split([':', '-']).collect();
        let valid = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(CoreError::ValidationFailed {
                message: format!("invalid MAC address: {raw:?}"),
            });
        }
        Ok(Self(octets.join(":").to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Devices ─────────────────────────────────────────────────────────

/// Identity of a device row: the `(mac, ip)` pair. A pair lives in at
/// most one of the approved / unapproved collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceKey {
    pub mac: MacAddress,
    pub ip: String,
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.mac, self.ip)
    }
}

/// One device as the synchronizers and UIs see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub key: DeviceKey,
    pub hostname: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
}

impl Device {
    /// Build a device from a wire record. Fails only on an invalid MAC;
    /// bad timestamps degrade to `None`.
    pub fn from_record(record: &DeviceRecord) -> Result<Self, CoreError> {
        Ok(Self {
            key: DeviceKey {
                mac: MacAddress::parse(&record.mac_address)?,
                ip: record.ip_address.clone(),
            },
            hostname: record.hostname.clone(),
            description: record.description.clone(),
            vendor: record.vendor.clone(),
            first_seen: parse_backend_datetime(record.first_seen.as_deref()),
            last_seen: parse_backend_datetime(record.last_seen.as_deref()),
        })
    }

    /// Render back into the wire shape for add/update calls.
    pub fn to_record(&self) -> DeviceRecord {
        DeviceRecord {
            mac_address: self.key.mac.to_string(),
            ip_address: self.key.ip.clone(),
            hostname: self.hostname.clone(),
            description: self.description.clone(),
            vendor: self.vendor.clone(),
            first_seen: self.first_seen.map(format_backend_datetime),
            last_seen: self.last_seen.map(format_backend_datetime),
        }
    }
}

// ── Planned scans ───────────────────────────────────────────────────

/// One recurring scan schedule.
///
/// `id` is a client-generated row identifier, stable across refreshes
/// for the same `(interval, target)` pair. The backend itself has no
/// row id; its delete endpoint keys by `interval` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedScan {
    pub id: Uuid,
    /// Scheduling interval in minutes.
    pub interval: i64,
    pub target: String,
    /// `None` means the schedule is paused.
    pub next_scan_at: Option<NaiveDateTime>,
    pub last_scan_at: Option<NaiveDateTime>,
}

impl PlannedScan {
    pub fn from_record(id: Uuid, record: &PlannedScanRecord) -> Self {
        Self {
            id,
            interval: record.interval,
            target: record.scan_target.clone(),
            next_scan_at: parse_backend_datetime(record.next_scan_at.as_deref()),
            last_scan_at: parse_backend_datetime(record.last_scan_at.as_deref()),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.next_scan_at.is_none()
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Session gate state. `Probing` means a `/me` check is outstanding;
/// UIs render nothing behind the gate until it resolves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    Probing,
    Authed {
        username: String,
    },
    #[default]
    Unauthenticated,
}

impl SessionState {
    pub fn is_authed(&self) -> bool {
        matches!(self, SessionState::Authed { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mac_parse_normalizes_case_and_separator() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_parse_rejects_short_and_garbage() {
        assert!(MacAddress::parse("aa:bb:cc").is_err());
        assert!(MacAddress::parse("zz:bb:cc:dd:ee:ff").is_err());
        assert!(MacAddress::parse("").is_err());
    }

    #[test]
    fn backend_datetime_round_trip() {
        let dt = parse_backend_datetime(Some("2026-08-30 12:34:56")).unwrap();
        assert_eq!(format_backend_datetime(dt), "2026-08-30 12:34:56");
    }

    #[test]
    fn bad_timestamp_degrades_to_none() {
        assert_eq!(parse_backend_datetime(Some("not a date")), None);
        assert_eq!(parse_backend_datetime(None), None);
    }

    #[test]
    fn device_from_record_tolerates_missing_fields() {
        let record = DeviceRecord {
            mac_address: "AA:BB:CC:DD:EE:FF".into(),
            ip_address: "192.168.1.10".into(),
            hostname: None,
            description: None,
            vendor: None,
            first_seen: Some("garbage".into()),
            last_seen: None,
        };
        let device = Device::from_record(&record).unwrap();
        assert_eq!(device.key.mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert!(device.first_seen.is_none());
    }

    #[test]
    fn planned_scan_paused_when_next_is_null() {
        let record = PlannedScanRecord {
            interval: 60,
            scan_target: "192.168.1.0/24".into(),
            next_scan_at: None,
            last_scan_at: Some("2026-08-30 11:00:00".into()),
        };
        let plan = PlannedScan::from_record(Uuid::new_v4(), &record);
        assert!(plan.is_paused());
        assert!(plan.last_scan_at.is_some());
    }
}

//! All possible UI actions. Actions are the sole mechanism for state
//! mutation: key handlers and background tasks emit them, the app loop
//! drains and applies them.

use std::sync::Arc;

use uuid::Uuid;

use lanwarden_core::{Device, DeviceKey, PlannedScan, SessionState};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation (gated) ────────────────────────────────────────
    /// User intent to go somewhere. Protected targets trigger a
    /// session probe before the switch happens.
    NavigateTo(ScreenId),
    /// The gate has resolved; actually activate the screen.
    ActivateScreen(ScreenId),

    // ── Session ───────────────────────────────────────────────────
    SessionChanged(SessionState),
    SubmitLogin { username: String, password: String },
    Logout,

    // ── Data (from core watch channels) ───────────────────────────
    ApprovedUpdated(Arc<Vec<Device>>),
    UnapprovedUpdated(Arc<Vec<Device>>),
    ScheduleUpdated(Arc<Vec<PlannedScan>>),
    DueCountUpdated(usize),
    /// The busy set changed; screens re-check their rows.
    BusyChanged,

    // ── Commands ──────────────────────────────────────────────────
    Refresh,
    Approve(DeviceKey),
    Revoke(DeviceKey),
    StartScan(String),
    PlanScan { interval: i64, target: String },
    RunNow(Uuid),
    PauseSchedule(Uuid),
    DeleteSchedule(Uuid),

    // ── Feedback ──────────────────────────────────────────────────
    Notify(Notification),
    /// One line for the Scans screen's activity log.
    LogLine(String),
    ToggleHelp,
}

// ── Core error types ──
//
// User-facing errors from lanwarden-core. Consumers never see raw HTTP
// status codes or JSON parse failures; the `From<lanwarden_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

use crate::busy::BusyKey;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Backend request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Planned scan not found: {identifier}")]
    PlannedScanNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation already in flight: {key}")]
    Busy { key: BusyKey },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// True when the error means the session is missing or expired and
    /// a (re-)login would help.
    pub fn needs_login(&self) -> bool {
        matches!(self, CoreError::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lanwarden_api::Error> for CoreError {
    fn from(err: lanwarden_api::Error) -> Self {
        match err {
            lanwarden_api::Error::Http { status: 401, body, .. } => {
                CoreError::AuthenticationFailed {
                    message: if body.is_empty() {
                        "session missing or expired".into()
                    } else {
                        body
                    },
                }
            }
            lanwarden_api::Error::Http {
                status,
                status_text,
                body,
            } => CoreError::Api {
                message: if body.is_empty() {
                    status_text
                } else {
                    format!("{status_text}: {body}")
                },
                status: Some(status),
            },
            lanwarden_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lanwarden_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lanwarden_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lanwarden_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn http_401_maps_to_authentication() {
        let err = lanwarden_api::Error::Http {
            status: 401,
            status_text: "Unauthorized".into(),
            body: "token expired".into(),
        };
        let core: CoreError = err.into();
        assert!(core.needs_login());
        assert!(core.to_string().contains("token expired"));
    }

    #[test]
    fn timeout_message_carries_no_duration() {
        let msg = CoreError::Timeout.to_string();
        assert_eq!(msg, "Backend request timed out");
    }

    #[test]
    fn http_500_maps_to_api_with_status() {
        let err = lanwarden_api::Error::Http {
            status: 500,
            status_text: "Internal Server Error".into(),
            body: "scanner offline".into(),
        };
        match CoreError::from(err) {
            CoreError::Api { message, status } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("scanner offline"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}

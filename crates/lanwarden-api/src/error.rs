use thiserror::Error;

/// Top-level error type for the `lanwarden-api` crate.
///
/// Covers every failure mode of the backend API surface. `lanwarden-core`
/// maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx HTTP response. Carries the status code, the status text,
    /// and the best-effort response body.
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the backend rejected the session (HTTP 401).
    ///
    /// The session gate treats this — like every other probe failure —
    /// as "unauthenticated", but callers surfacing errors want to tell
    /// "log in again" apart from "backend is down".
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Returns `true` if this is a transient error worth retrying manually.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_only_for_401() {
        let err = Error::Http {
            status: 401,
            status_text: "Unauthorized".into(),
            body: String::new(),
        };
        assert!(err.is_unauthorized());

        let err = Error::Http {
            status: 500,
            status_text: "Internal Server Error".into(),
            body: String::new(),
        };
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn http_error_message_carries_all_three_parts() {
        let err = Error::Http {
            status: 400,
            status_text: "Bad Request".into(),
            body: "interval must be > 0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Bad Request"));
        assert!(msg.contains("interval must be > 0"));
    }
}

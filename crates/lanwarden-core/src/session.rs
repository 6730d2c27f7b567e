// ── Session gate ──
//
// One `/me` probe per protected navigation. The gate fails toward
// login: any non-OK status or transport failure resolves to
// `Unauthenticated`, never to the protected view. No retry, no
// caching of probe results.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

use lanwarden_api::ApiClient;

use crate::error::CoreError;
use crate::model::SessionState;

pub struct SessionGate {
    api: Arc<ApiClient>,
    state: watch::Sender<SessionState>,
}

impl SessionGate {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self { api, state }
    }

    /// Current state (cheap clone).
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Probe session validity with one credentialed `/me` call.
    ///
    /// The state is `Probing` while the call is outstanding. Returns
    /// the resolved state; never errors, because every failure mode
    /// maps to `Unauthenticated`.
    pub async fn probe(&self) -> SessionState {
        self.state.send_replace(SessionState::Probing);

        let resolved = match self.api.me().await {
            Ok(me) if me.ok => SessionState::Authed {
                username: me.username.unwrap_or_default(),
            },
            Ok(_) => SessionState::Unauthenticated,
            Err(e) => {
                debug!(error = %e, "session probe failed, treating as unauthenticated");
                SessionState::Unauthenticated
            }
        };

        self.state.send_replace(resolved.clone());
        resolved
    }

    /// Authenticate and re-probe. On success the server has set the
    /// session cookie in the shared jar, so the probe confirms it and
    /// records the username.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        self.api.login(username, password).await?;
        match self.probe().await {
            SessionState::Authed { .. } => Ok(()),
            _ => Err(CoreError::AuthenticationFailed {
                message: "login accepted but session probe failed".into(),
            }),
        }
    }

    /// Clear the server session. Local state goes to `Unauthenticated`
    /// even if the server call fails.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let result = self.api.logout().await;
        self.state.send_replace(SessionState::Unauthenticated);
        if let Err(ref e) = result {
            warn!(error = %e, "logout call failed, local session cleared anyway");
        }
        result.map_err(CoreError::from)
    }
}

// Session endpoints: /login, /logout, /me.
//
// The backend issues a JWT in a cookie on successful login; the cookie
// jar in the transport carries it on every subsequent request.

use secrecy::{ExposeSecret, SecretString};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AckResponse, LoginRequest, MeResponse};

impl ApiClient {
    /// Authenticate with the backend. On success the server sets the
    /// session cookie in this client's jar.
    ///
    /// A 401 response (wrong credentials) surfaces as [`Error::Http`]
    /// with the backend's error body — check
    /// [`is_unauthorized`](Error::is_unauthorized).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let _: Option<AckResponse> = self.post("login", &body).await?;
        Ok(())
    }

    /// Clear the server-side session (the server unsets the cookie).
    pub async fn logout(&self) -> Result<(), Error> {
        let _: Option<AckResponse> = self.post_empty("logout").await?;
        Ok(())
    }

    /// Probe session validity. Returns the authenticated username.
    ///
    /// Any non-OK status means the session is invalid; transport errors
    /// mean the backend is unreachable. The session gate treats both as
    /// "unauthenticated".
    pub async fn me(&self) -> Result<MeResponse, Error> {
        let resp: Option<MeResponse> = self.get("me").await?;
        Ok(resp.unwrap_or(MeResponse {
            ok: true,
            username: None,
        }))
    }
}

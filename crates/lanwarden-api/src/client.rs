// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining and the backend's
// response contract. Endpoint groups (auth, devices, scans) are inherent
// methods in separate files so this module stays focused on transport
// mechanics.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_LEN: usize = 200;

/// Credentialed JSON client for the scanner backend.
///
/// All requests go through [`request`](Self::request): JSON bodies when
/// present, cookies always. Decoding rules:
/// - non-2xx status → [`Error::Http`] with status, status text, and the
///   best-effort body text
/// - 2xx with a non-JSON `Content-Type` → `Ok(None)` — callers treat
///   "no content" as a valid success distinct from failure
/// - 2xx JSON → deserialized `Ok(Some(T))`
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a base URL (e.g. `http://host:5000/api/v1`)
    /// and a `TransportConfig`.
    ///
    /// A cookie jar is created automatically if the config doesn't carry
    /// one — session auth is cookie-based, so a jar is not optional.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when the caller already manages a client (tests, or a
    /// shared jar across clients).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an endpoint path: `{base}/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a bodyless request.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let resp = self.http.request(method, url).send().await?;
        Self::decode(resp).await
    }

    /// Send a request with a JSON body.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let resp = self.http.request(method, url).json(body).send().await?;
        Self::decode(resp).await
    }

    /// Apply the response contract: status check, content-type check,
    /// deserialization with a body preview on failure.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_owned(),
                body,
            });
        }

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if !is_json {
            debug!(status = status.as_u16(), "non-JSON response, treating as no content");
            return Ok(None);
        }

        let body = resp.text().await?;
        let value: T = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(Some(value))
    }

    // ── Thin method wrappers used by the endpoint modules ────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        self.request(Method::GET, path).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        self.request_json(Method::POST, path, body).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, Error> {
        self.request(Method::POST, path).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        self.request_json(Method::PUT, path, body).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        self.request_json(Method::DELETE, path, body).await
    }
}

/// Truncate a body for error messages, backing up to a char boundary so
/// multi-byte UTF-8 text never splits mid-character.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(BODY_PREVIEW_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = format!("{}ééééé", "x".repeat(BODY_PREVIEW_LEN - 1));
        let p = preview(&body);
        assert!(p.ends_with('x'));
        assert_eq!(p.len(), BODY_PREVIEW_LEN - 1);

        let short = "{\"ok\": trué}";
        assert_eq!(preview(short), short);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://host:5000/api/v1/").unwrap(),
        );
        let url = client.endpoint("/getApproved").unwrap();
        assert_eq!(url.as_str(), "http://host:5000/api/v1/getApproved");
    }

    #[test]
    fn endpoint_preserves_nested_paths() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://host:5000/api/v1").unwrap(),
        );
        let url = client.endpoint("plannedScans/all").unwrap();
        assert_eq!(url.as_str(), "http://host:5000/api/v1/plannedScans/all");
    }
}

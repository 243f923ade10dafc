use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Which lifetime a session was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// One per run; keeps cookies so auth state carries across scenarios.
    Shared,
    /// One per scenario; no cookie jar, no assumed auth.
    Public,
}

/// HTTP client bound to the target's base URL.
///
/// Connections are released when the session is dropped, which covers
/// passing, failing and panicking scenarios alike. `close` is the explicit
/// spelling of the same thing.
pub struct Session {
    client: Client,
    base_url: String,
    kind: SessionKind,
}

impl Session {
    pub fn shared(config: &HarnessConfig) -> HarnessResult<Self> {
        Self::build(config, SessionKind::Shared)
    }

    pub fn public(config: &HarnessConfig) -> HarnessResult<Self> {
        Self::build(config, SessionKind::Public)
    }

    fn build(config: &HarnessConfig, kind: SessionKind) -> HarnessResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Redirects stay visible: a 302 to the login page is an answer we assert on.
        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .cookie_store(kind == SessionKind::Shared);

        if let Some(timeout) = config.target.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        debug!(?kind, base_url = %config.base_url(), "Opened session");

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            kind,
        })
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        let url = self.url(path);
        debug!(kind = ?self.kind, %url, "GET");
        let response = self.client.get(&url).send().await?;
        ApiResponse::read(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> HarnessResult<ApiResponse> {
        let url = self.url(path);
        debug!(kind = ?self.kind, %url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        ApiResponse::read(response).await
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(kind = ?self.kind, base_url = %self.base_url, "Closed session");
    }
}

/// Status and raw body of one response. The body is kept as text so a
/// non-JSON answer can still be shown in a failure.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    async fn read(response: reqwest::Response) -> HarnessResult<Self> {
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(Self { status, body })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> HarnessResult<Value> {
        serde_json::from_str(&self.body).map_err(|source| HarnessError::MalformedBody {
            status: self.status,
            body: self.body.clone(),
            source,
        })
    }
}

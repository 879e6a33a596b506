//! Shared HTTP transport: base URL, default headers, bearer auth and the 401 policy.

use crate::config::{ClientConfig, HttpMethod};
use crate::envelope::Envelope;
use crate::error::AdminError;
use crate::store::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Process-wide auth notifications raised by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// A request came back 401; credentials are gone and the shell should show the login entry point.
    LoginRequired,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Cheap to clone; clones share the connection pool and the auth event channel.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: Option<Arc<SessionStore>>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AdminError::Transport {
                status: None,
                message: format!("failed to create client: {}", e),
            })?;
        let (auth_events, _) = broadcast::channel(16);
        Ok(HttpTransport {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session: None,
            auth_events,
        })
    }

    /// Attach the session whose token is sent and which is cleared on 401.
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request and decode the envelope. The business code is left to the caller.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Envelope, AdminError> {
        let url = self.url(path);
        tracing::debug!(method = ?method, url = %url, "request");
        let mut req = self.client.request(method.into(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.session.as_ref().and_then(|s| s.access_token()) {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.on_unauthorized();
            return Err(AdminError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = %status, body = %text, "request failed");
            return Err(AdminError::Transport {
                status: Some(status.as_u16()),
                message: format!("{} {}", status, text.trim()),
            });
        }
        let envelope: Envelope = response.json().await?;
        Ok(envelope)
    }

    fn on_unauthorized(&self) {
        tracing::info!("unauthorized response, clearing credentials");
        if let Some(session) = &self.session {
            if let Err(e) = session.clear() {
                tracing::error!(error = %e, "failed to clear persisted credentials");
            }
        }
        // No subscribers is fine: nothing is mounted to react.
        let _ = self.auth_events.send(AuthEvent::LoginRequired);
    }
}

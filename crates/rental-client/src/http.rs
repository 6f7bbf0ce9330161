//! # HTTP Client Wrapper
//!
//! One `reqwest::Client` shared by every resource API. This is the only
//! place that knows about headers, status codes and error bodies.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  api::categories.list(params)                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  HttpClient::execute                                                    │
//! │    ├── Authorization: Bearer <token>   (SessionProvider)                │
//! │    ├── X-Request-ID: <uuid v4>                                          │
//! │    ├── timeout (config, default 10 s)                                   │
//! │    │                                                                    │
//! │    ▼ response                                                           │
//! │    ├── 2xx ──────────► JSON body (empty body = null)                    │
//! │    ├── 401 ──────────► session.on_unauthorized() ─► Unauthorized        │
//! │    ├── other non-2xx ► Api { status, message, field_errors }            │
//! │    └── no response ──► Connection / Timeout                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  envelope::into_model / into_page / into_report                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use reqwest::{Method, RequestBuilder, StatusCode};
use rental_core::envelope::{self, DEFAULT_ERROR_MESSAGE};
use rental_core::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

// =============================================================================
// Session Seam
// =============================================================================

/// Supplies the bearer token and reacts to a rejected one.
///
/// Implemented by the auth store handle. Both methods are synchronous so the
/// HTTP layer never waits on the store.
pub trait SessionProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;

    /// Called once per 401 response. Token refresh is not attempted.
    fn on_unauthorized(&self);
}

/// For unauthenticated use (login, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSession;

impl SessionProvider for NoSession {
    fn access_token(&self) -> Option<String> {
        None
    }

    fn on_unauthorized(&self) {}
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    session: Arc<dyn SessionProvider>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HttpClient {
    /// Builds a client from config with no session attached.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_session(config, Arc::new(NoSession))
    }

    pub fn with_session(
        config: &ClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(HttpClient {
            client,
            base_url: config.base_url().to_string(),
            timeout_secs: config.api.timeout_secs,
            session,
        })
    }

    /// Same connection pool, different session.
    pub fn set_session(&mut self, session: Arc<dyn SessionProvider>) {
        self.session = session;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET` a single model.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body = self.send(Method::GET, path, |b| b).await?;
        Ok(envelope::into_model(body)?)
    }

    /// `GET` a single model with query parameters.
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::GET, path, |b| b.query(query)).await?;
        Ok(envelope::into_model(body)?)
    }

    /// `GET` a list in any of the backend's list shapes.
    pub async fn get_page<Q, T>(&self, path: &str, query: &Q) -> ClientResult<Page<T>>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::GET, path, |b| b.query(query)).await?;
        Ok(envelope::into_page(body)?)
    }

    /// `GET` a report envelope: rows plus a summary.
    pub async fn get_report<Q, T, S>(&self, path: &str, query: &Q) -> ClientResult<(Page<T>, Option<S>)>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
        S: DeserializeOwned,
    {
        let body = self.send(Method::GET, path, |b| b.query(query)).await?;
        Ok(envelope::into_report(body)?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::POST, path, |b| b.json(body)).await?;
        Ok(envelope::into_model(body)?)
    }

    /// `POST` with no request body, ignoring the response body.
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        let body = self.send(Method::POST, path, |b| b).await?;
        envelope::unwrap_data(body)?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::PUT, path, |b| b.json(body)).await?;
        Ok(envelope::into_model(body)?)
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(Method::PATCH, path, |b| b.json(body)).await?;
        Ok(envelope::into_model(body)?)
    }

    /// `DELETE`. Accepts 204, `null`, or any wrapper that is not a rejection.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let body = self.send(Method::DELETE, path, |b| b).await?;
        envelope::unwrap_data(body)?;
        Ok(())
    }

    /// Raw body for callers that need to inspect the shape themselves.
    pub async fn get_value<Q>(&self, path: &str, query: &Q) -> ClientResult<Value>
    where
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |b| b.query(query)).await
    }

    // =========================================================================
    // Execution
    // =========================================================================

    async fn send<F>(&self, method: Method, path: &str, configure: F) -> ClientResult<Value>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = configure(self.client.request(method.clone(), self.url(path)))
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                warn!(%method, path, elapsed_ms, request_id = %request_id, error = %e, "API request failed");
                return Err(self.transport_error(e));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            request_id = %request_id,
            "API request"
        );

        let body = parse_body(&text);
        if status.is_success() {
            return Ok(body);
        }
        Err(self.status_error(status, &body))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::from(err)
        }
    }

    fn status_error(&self, status: StatusCode, body: &Value) -> ClientError {
        let message = envelope::error_message(body)
            .or_else(|| body.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from))
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

        if status == StatusCode::UNAUTHORIZED {
            warn!(message = %message, "Session rejected by server, clearing session");
            self.session.on_unauthorized();
            return ClientError::Unauthorized(message);
        }

        ClientError::Api {
            status: status.as_u16(),
            message,
            field_errors: envelope::field_errors(body),
        }
    }
}

/// Empty bodies become `null`; non-JSON text is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

//! Authenticated request wrapper.
//!
//! Every request carries `Authorization: Bearer <token>` when a token is
//! stored. A 401 or 403 on an authenticated call clears the token and
//! surfaces [`ClientError::SessionExpired`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the session token lives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> std::io::Result<()>;
    fn clear(&self) -> std::io::Result<()>;
}

/// Keeps the token for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save(&self, token: &str) -> std::io::Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Persists the token in a file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Error body rendered by the server.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// HTTP client bound to one server and one token store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, tokens, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn has_token(&self) -> bool {
        self.tokens.load().is_some()
    }

    pub fn store_token(&self, token: &str) {
        if let Err(e) = self.tokens.save(token) {
            warn!(error = %e, "Failed to persist session token");
        }
    }

    pub fn clear_token(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear session token");
        }
    }

    /// Sends a request with the stored token and the caller's headers.
    ///
    /// Caller headers override the defaults, including `Authorization`.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, headers, true).await
    }

    /// Sends a request without session handling. Used for login, where a
    /// 401 means bad credentials rather than an expired session.
    pub async fn request_anonymous<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, HeaderMap::new(), false).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
        authenticated: bool,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut merged = HeaderMap::new();
        merged.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if authenticated {
            if let Some(token) = self.tokens.load() {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ClientError::Decode(format!("Invalid stored token: {}", e)))?;
                merged.insert(AUTHORIZATION, value);
            }
        }
        merged.extend(headers);

        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self.http.request(method, &url).headers(merged);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ClientError::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if authenticated && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = status.as_u16(), "Session rejected by server");
            self.clear_token();
            return Err(ClientError::SessionExpired);
        }

        Err(error_from_response(response).await)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .request::<()>(Method::GET, path, None, HeaderMap::new())
            .await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, path, Some(body), HeaderMap::new())
            .await?;
        decode(response).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, path, Some(body), HeaderMap::new())
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request::<()>(Method::DELETE, path, None, HeaderMap::new())
            .await?;
        Ok(())
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json::<T>().await.map_err(ClientError::from_reqwest)
}

/// Builds an `Api` error from the server's `message` (or `error`) field.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback_message(status));

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

fn fallback_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed: {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

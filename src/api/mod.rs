pub mod auth;
pub mod data;
pub mod payments;
pub mod storage;

use crate::config::BackendConfig;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from the remote collaborators. `Remote` carries the
/// collaborator's own message verbatim; everything is rendered for the user
/// at the command boundary and nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Remote(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Client for the managed backend: auth, data tables, object storage, and
/// the two payment function endpoints. Each concern lives in its own
/// submodule; this struct only carries the connection.
pub struct Backend {
    http: Client,
    config: BackendConfig,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Self {
        Backend {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url, path)
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.config.base_url, name)
    }

    fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, bucket, path
        )
    }

    /// Start a request with the backend's standard headers. The anon key
    /// authenticates the app; the bearer token is the user's access token
    /// when a session exists, the anon key otherwise.
    fn request(&self, method: Method, url: String, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.config.anon_key);
        self.http
            .request(method, url)
            .header("apikey", self.config.anon_key.clone())
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response: Response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok((status, body))
    }

    /// Send, then decode a successful JSON body or surface the error body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(ApiError::Remote(error_message(status, &body)));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send, only checking for success; the body is discarded.
    async fn send_ok(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(ApiError::Remote(error_message(status, &body)));
        }
        Ok(())
    }
}

/// User-facing message for an unsuccessful response: prefer the
/// collaborator's JSON error fields, degrade to the raw text for non-JSON
/// bodies, fall back to the bare HTTP status.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "msg", "error_description"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("HTTP {}", status.as_u16())
}

/// PostgREST representation responses are arrays even for single-row
/// writes; unwrap the first row.
pub(crate) fn single_row<T>(mut rows: Vec<T>) -> Result<T, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::Decode("empty representation".to_string()));
    }
    Ok(rows.remove(0))
}

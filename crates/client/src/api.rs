//! HTTP clients for the core and auth APIs.
//!
//! Both clients share one pre-request hook that attaches the bearer token
//! read from local storage.

use std::sync::Arc;

use reqwest::{
    Method, RequestBuilder, StatusCode, Url,
    header::{self, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::{ClientError, Result, StorageError},
    outcome::HasStatus,
    storage::Storage,
    token,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub core_url: String,
    pub auth_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            core_url: "http://127.0.0.1:8080/api".to_string(),
            auth_url: "http://127.0.0.1:8081/auth".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request hook failed: {0}")]
    Hook(#[from] StorageError),
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] header::InvalidHeaderValue),
    #[error("invalid request path {path}: {message}")]
    InvalidPath { path: String, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text of the server's error response, or `default` when the server did
    /// not send a plain message.
    pub fn message_or(&self, default: &str) -> String {
        let Self::Status { body, .. } = self else {
            return default.to_string();
        };
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::String(message)) if !message.is_empty() => message,
            Ok(_) => default.to_string(),
            Err(_) if !body.is_empty() => body.clone(),
            Err(_) => default.to_string(),
        }
    }
}

impl HasStatus for ApiError {
    fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    name: &'static str,
    base_url: String,
    http: reqwest::Client,
    storage: Arc<dyn Storage>,
}

impl ApiClient {
    pub fn new(name: &'static str, base_url: &str, storage: Arc<dyn Storage>) -> Result<Self> {
        Url::parse(base_url).map_err(|err| ClientError::BaseUrl(format!("{base_url}: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            storage,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> std::result::Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|err| ApiError::InvalidPath {
            path: path.to_string(),
            message: err.to_string(),
        })
    }

    /// Pre-request hook.
    ///
    /// Attaches `Authorization: Bearer <token>` when a valid token is stored
    /// and leaves the request untouched otherwise. A token that cannot be
    /// decoded is treated as absent. Storage failures abort the request.
    pub fn authorize(&self, request: RequestBuilder) -> std::result::Result<RequestBuilder, ApiError> {
        let token = match token::get_auth_token(self.storage.as_ref()) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(request),
            Err(ClientError::Storage(err)) => return Err(ApiError::Hook(err)),
            Err(err) => {
                tracing::warn!(client = self.name, "ignoring unreadable auth token: {err}");
                return Ok(request);
            }
        };
        let mut value = HeaderValue::try_from(format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(request.header(header::AUTHORIZATION, value))
    }

    /// Builds a request for `path` with the pre-request hook applied.
    pub fn request(&self, method: Method, path: &str) -> std::result::Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        self.authorize(self.http.request(method, url))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ApiError> {
        self.send(self.request(Method::GET, path)?).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    pub async fn delete(&self, path: &str) -> std::result::Result<(), ApiError> {
        let _: serde_json::Value = self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// Sends a prepared request and decodes a JSON response.
    ///
    /// An empty success body decodes as JSON `null`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let res = request.send().await?;
        let status = res.status();
        tracing::debug!(client = self.name, status = %status, url = %res.url(), "response received");

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let bytes = res.bytes().await?;
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        Ok(serde_json::from_slice(body)?)
    }
}

/// The two configured API clients.
#[derive(Debug, Clone)]
pub struct ApiClients {
    pub core: ApiClient,
    pub auth: ApiClient,
}

impl ApiClients {
    pub fn new(settings: &ApiSettings, storage: Arc<dyn Storage>) -> Result<Self> {
        Ok(Self {
            core: ApiClient::new("core", &settings.core_url, storage.clone())?,
            auth: ApiClient::new("auth", &settings.auth_url, storage)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        storage::{AUTH_TOKEN, MemoryStorage},
        token::tests::{token_expiring_at, token_with_payload},
    };

    fn authorization_for(stored: Option<&str>) -> Option<String> {
        let storage = MemoryStorage::new();
        if let Some(token) = stored {
            storage.set_item(AUTH_TOKEN, token).unwrap();
        }
        let client = ApiClient::new("core", "http://localhost/api", Arc::new(storage)).unwrap();
        let request = client.request(Method::GET, "/orders").unwrap().build().unwrap();
        request
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().unwrap().to_string())
    }

    fn status_error(status: u16, body: &str) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = ApiClient::new("core", "not a url", Arc::new(MemoryStorage::new())).unwrap_err();
        assert!(matches!(err, ClientError::BaseUrl(_)));
    }

    #[test]
    fn joins_paths_like_a_base_url() {
        let client =
            ApiClient::new("core", "http://localhost/api/", Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(client.url("/orders").unwrap().as_str(), "http://localhost/api/orders");
        assert_eq!(client.url("orders/1").unwrap().as_str(), "http://localhost/api/orders/1");
    }

    #[test]
    fn message_or_prefers_plain_body() {
        assert_eq!(status_error(400, "CNPJ inválido").message_or("Erro"), "CNPJ inválido");
        assert_eq!(status_error(400, "\"Pedido duplicado\"").message_or("Erro"), "Pedido duplicado");
        assert_eq!(status_error(400, "").message_or("Erro"), "Erro");
        assert_eq!(status_error(400, r#"{"error":"x"}"#).message_or("Erro"), "Erro");
    }

    #[test]
    fn only_status_errors_carry_a_status() {
        assert_eq!(status_error(409, "").status(), Some(StatusCode::CONFLICT));
        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(ApiError::Decode(decode).status(), None);
    }

    #[test]
    fn hook_follows_the_token_accessor() {
        let valid = token_expiring_at(i64::from(i32::MAX));
        assert_eq!(authorization_for(Some(&valid)), Some(format!("Bearer {valid}")));
        assert_eq!(authorization_for(None), None);
        assert_eq!(authorization_for(Some("")), None);
        assert_eq!(authorization_for(Some(&token_expiring_at(1))), None);
        assert_eq!(authorization_for(Some(&token_with_payload(r#"{"exp":null}"#))), None);
        assert_eq!(authorization_for(Some("garbage")), None);
    }

    #[test]
    fn authorization_header_is_sensitive() {
        let storage = MemoryStorage::new();
        storage.set_item(AUTH_TOKEN, &token_expiring_at(i64::from(i32::MAX))).unwrap();
        let client = ApiClient::new("core", "http://localhost/api", Arc::new(storage)).unwrap();
        let request = client.request(Method::GET, "/orders").unwrap().build().unwrap();
        assert!(request.headers()[header::AUTHORIZATION].is_sensitive());
    }
}

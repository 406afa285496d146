//! Identity store reached over a JSON REST API.
//!
//! - `POST {base}/users` with `{"email", "attributes", "message_action": "SUPPRESS"}`
//! - `PATCH {base}/users/{email}` with `{"attributes"}`
//! - `DELETE {base}/users/{email}`

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde_json::json;

use crate::error::{Result, SyncError};

use super::provider::{IdentityStore, StoreError, StoreResult, UserAttributes};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`RestIdentityStore`].
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL; user resources live under `{base_url}/users`.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST identity store.
pub struct RestIdentityStore {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl RestIdentityStore {
    /// Create a store from its configuration.
    pub fn new(config: RestStoreConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SyncError::Configuration(format!("Invalid store URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Configuration(format!(
                "Store URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| SyncError::Configuration(format!("Invalid store token: {}", e)))?,
            );
        }

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    /// URL of the users collection, or of one user when `email` is given.
    fn users_url(&self, email: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users");
            if let Some(email) = email {
                segments.push(email);
            }
        }
        url
    }

    fn send(&self, request: RequestBuilder, email: &str) -> StoreResult<()> {
        let response = request
            .headers(self.headers.clone())
            .send()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        tracing::debug!(email, status = status.as_u16(), "Identity store response");

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(email.to_string()),
            StatusCode::CONFLICT => StoreError::AlreadyExists(email.to_string()),
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                StoreError::Unavailable(format!("{} {}", status, body).trim().to_string())
            }
            _ => StoreError::Rejected(format!("{} {}", status, body).trim().to_string()),
        })
    }
}

impl IdentityStore for RestIdentityStore {
    fn create(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()> {
        let url = self.users_url(None);
        tracing::debug!(%url, email, "POST user");
        let body = json!({
            "email": email,
            "attributes": attributes,
            "message_action": "SUPPRESS",
        });
        self.send(self.client.post(url).json(&body), email)
    }

    fn update_attributes(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()> {
        let url = self.users_url(Some(email));
        tracing::debug!(%url, email, "PATCH user");
        let body = json!({ "attributes": attributes });
        self.send(self.client.patch(url).json(&body), email)
    }

    fn delete(&self, email: &str) -> StoreResult<()> {
        let url = self.users_url(Some(email));
        tracing::debug!(%url, email, "DELETE user");
        self.send(self.client.delete(url), email)
    }

    fn name(&self) -> &str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_urls() {
        let store = RestIdentityStore::new(RestStoreConfig::new("https://idp.example.com/api/"))
            .unwrap();

        assert_eq!(
            store.users_url(None).as_str(),
            "https://idp.example.com/api/users"
        );
        assert_eq!(
            store.users_url(Some("a.b+c@example.com")).as_str(),
            "https://idp.example.com/api/users/a.b+c@example.com"
        );
        assert_eq!(
            store.users_url(Some("x/y@example.com")).as_str(),
            "https://idp.example.com/api/users/x%2Fy@example.com"
        );
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let err = RestIdentityStore::new(RestStoreConfig::new("not a url")).err();
        assert!(matches!(err, Some(SyncError::Configuration(_))));

        let err = RestIdentityStore::new(RestStoreConfig::new("mailto:ops@example.com")).err();
        assert!(matches!(err, Some(SyncError::Configuration(_))));
    }

    #[test]
    fn test_unreachable_host_is_unavailable() {
        let store = RestIdentityStore::new(
            RestStoreConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(500)),
        )
        .unwrap();

        let err = store.delete("a@example.com").unwrap_err();
        assert!(err.is_fatal());
    }
}

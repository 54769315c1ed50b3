//! HTTP plumbing shared by every API resource.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use crate::config::ApiConfig;

/// Header carrying the storefront's API key.
const STOREFRONT_KEY_HEADER: &str = "X-Storefront-Key";

/// Body snippet length kept in logs and errors.
const SNIPPET_LEN: usize = 500;

/// Client for the commerce REST API.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    storefront_key: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Validation(format!("invalid API base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("harbor-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                storefront_key: config.storefront_key.clone(),
                cache,
            }),
        })
    }

    /// Build the URL for a path under the API base, percent-encoding each
    /// segment.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request with the storefront key and optional customer token.
    pub(super) fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&SecretString>,
    ) -> RequestBuilder {
        let mut builder = self
            .inner
            .http
            .request(method, self.endpoint(segments))
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(key) = &self.inner.storefront_key {
            builder = builder.header(STOREFRONT_KEY_HEADER, key.expose_secret());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Send a request and decode the JSON body.
    pub(super) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.send_raw(builder).await?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %snippet(&text),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Send a request whose response body is ignored.
    pub(super) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(builder).await.map(|_| ())
    }

    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        // Read the body first for better error diagnostics
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let error = error_for_status(status, retry_after, &text);
        match &error {
            ApiError::NotFound(_) | ApiError::Unauthorized | ApiError::Validation(_) => {
                tracing::debug!(status = %status, error = %error, "API rejected request");
            }
            _ => {
                tracing::error!(
                    status = %status,
                    body = %snippet(&text),
                    "API returned non-success status"
                );
            }
        }
        Err(error)
    }

    pub(super) async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    pub(super) async fn cache(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }
}

/// Map a non-success status to an `ApiError`.
pub(super) fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(
            extract_message(body).unwrap_or_else(|| "resource not found".to_string()),
        ),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(retry_after.unwrap_or(1)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(
            extract_message(body).unwrap_or_else(|| "The request was rejected.".to_string()),
        ),
        other => ApiError::Status(other.as_u16(), snippet(body)),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": ..}`, `{"error": ..}` and `{"errors": [{"message": ..}]}`.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| value.get("error").and_then(serde_json::Value::as_str))
        .or_else(|| {
            value
                .get("errors")
                .and_then(serde_json::Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(|first| first.get("message"))
                .and_then(serde_json::Value::as_str)
        })?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            storefront_key: None,
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let api = client("https://api.example.com/v1");
        let url = api.endpoint(&["products", "áo dài"]);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/products/%C3%A1o%20d%C3%A0i"
        );
    }

    #[test]
    fn test_endpoint_with_root_base() {
        let api = client("https://api.example.com");
        let url = api.endpoint(&["carts", "abc", "items"]);
        assert_eq!(url.as_str(), "https://api.example.com/carts/abc/items");
    }

    #[test]
    fn test_error_for_status_not_found() {
        let err = error_for_status(StatusCode::NOT_FOUND, None, "");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_error_for_status_unauthorized() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, None, "{}");
        assert!(matches!(err, ApiError::Unauthorized));
        let err = error_for_status(StatusCode::FORBIDDEN, None, "{}");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_for_status_rate_limited_defaults_to_one_second() {
        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, None, "");
        assert!(matches!(err, ApiError::RateLimited(1)));
        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, Some(30), "");
        assert!(matches!(err, ApiError::RateLimited(30)));
    }

    #[test]
    fn test_error_for_status_validation_message_shapes() {
        let err = error_for_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            r#"{"message": "Ward is required"}"#,
        );
        assert_eq!(err.to_string(), "Validation error: Ward is required");

        let err = error_for_status(StatusCode::BAD_REQUEST, None, r#"{"error": "Bad email"}"#);
        assert_eq!(err.to_string(), "Validation error: Bad email");

        let err = error_for_status(
            StatusCode::BAD_REQUEST,
            None,
            r#"{"errors": [{"message": "Out of stock"}]}"#,
        );
        assert_eq!(err.to_string(), "Validation error: Out of stock");

        let err = error_for_status(StatusCode::BAD_REQUEST, None, "not json");
        assert_eq!(err.to_string(), "Validation error: The request was rejected.");
    }

    #[test]
    fn test_error_for_status_other_keeps_snippet() {
        let body = "x".repeat(2000);
        let err = error_for_status(StatusCode::BAD_GATEWAY, None, &body);
        match err {
            ApiError::Status(code, snippet) => {
                assert_eq!(code, 502);
                assert_eq!(snippet.len(), SNIPPET_LEN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

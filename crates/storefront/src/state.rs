//! Application state shared across handlers.

use std::sync::Arc;

use harbor_core::CurrencyCode;
use sqlx::PgPool;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("API client: {0}")]
    Api(#[from] ApiError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// Cheap to clone via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: ApiClient,
    content: ContentStore,
}

impl AppState {
    /// Build the state: API client from config, content from the content
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built or the content
    /// directory cannot be read.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let content = ContentStore::load(&config.content_dir)?;
        tracing::info!(pages = content.len(), "Content loaded");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                content,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The commerce API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Currency used when an API payload does not name one.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.config.currency
    }
}

//! CLI subcommands.

pub mod api;
pub mod migrate;

use thiserror::Error;

/// Errors from any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] harbor_storefront::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    SessionStore(#[from] tower_sessions::session_store::Error),

    #[error("API error: {0}")]
    Api(#[from] harbor_storefront::api::ApiError),
}

//! Session store commands.
//!
//! The storefront keeps nothing but sessions in `PostgreSQL`; the table
//! lives in the `tower_sessions` schema and is owned by the session store.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

use harbor_storefront::db;

use super::CommandError;

/// Connect to the session database and wrap it in the session store.
async fn session_store() -> Result<PostgresStore, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(PostgresStore::new(pool))
}

/// Create the session schema and table if they do not exist.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the DDL fails.
pub async fn sessions() -> Result<(), CommandError> {
    let store = session_store().await?;

    tracing::info!("Creating session table...");
    store.migrate().await?;

    tracing::info!("Session table ready");
    Ok(())
}

/// Delete sessions past their expiry.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the delete fails.
pub async fn purge_expired() -> Result<(), CommandError> {
    let store = session_store().await?;

    store.delete_expired().await?;

    tracing::info!("Expired sessions deleted");
    Ok(())
}

//! Session store database schema.

use sqlx::PgPool;
use sqlx::migrate::Migrator;

use epoch_core::error::DomainError;

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies any pending migrations.
///
/// # Errors
///
/// Returns `DomainError::StoreUnavailable` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::StoreUnavailable(format!("migration failed: {e}")))?;
    tracing::info!("session store migrations applied");
    Ok(())
}

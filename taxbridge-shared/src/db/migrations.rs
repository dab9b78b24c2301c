/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root as reversible
/// sqlx migration pairs (`{version}_{name}.up.sql` / `.down.sql`) and are
/// embedded into the binary with `sqlx::migrate!`.

use sqlx::postgres::PgPool;
use tracing::info;

/// Runs all pending database migrations.
///
/// Safe to call on every startup; already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the recorded
/// checksums no longer match the embedded files.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("Database migrations up to date");
    Ok(())
}

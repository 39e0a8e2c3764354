//! Schema migrations, embedded at compile time from `migrations/sqlite/`.
//!
//! ```text
//! 001_initial_schema.sql   users, products, orders (+ indexes, CHECKs)
//! ```
//!
//! Applied ones are recorded in `_sqlx_migrations`. Add a new numbered
//! file for schema changes; released files are never edited, since sqlx
//! checksums them.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded. Each runs in its own
/// transaction; already-applied ones are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(count = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts, printed by the seed tool.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

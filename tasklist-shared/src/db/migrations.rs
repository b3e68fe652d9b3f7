/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded into the binary with `sqlx::migrate!`, so a deployed server
/// needs no files next to it.
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasklist_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{debug, info, warn};

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

impl MigrationStatus {
    /// Number of migrations compiled into this build
    pub fn known_migrations() -> usize {
        sqlx::migrate!("../migrations").iter().count()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.applied_migrations >= Self::known_migrations()
    }
}

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration is malformed, fails to execute, or was
/// modified after being applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("../migrations");
    info!(known = migrator.iter().count(), "Applying pending migrations");

    migrator
        .run(pool)
        .await
        .inspect(|_| info!("Schema is up to date"))
        .inspect_err(|e| warn!(error = %e, "Migration failed"))
}

/// Reads the applied migrations from `_sqlx_migrations`
///
/// A database that has never been migrated reports zero.
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;

    let (count, latest_version): (i64, Option<i64>) = if tracked {
        sqlx::query_as("SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?
    } else {
        (0, None)
    };

    let status = MigrationStatus {
        applied_migrations: usize::try_from(count).unwrap_or_default(),
        latest_version,
    };
    debug!(?status, "Read migration status");

    Ok(status)
}

/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: embedded migration runner and status reporting
/// - `seed`: optional demo users and tasks for local runs
///
/// Row-level queries live next to their models in the `models` module; the
/// services reach them through the `repository` traits.
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod seed;

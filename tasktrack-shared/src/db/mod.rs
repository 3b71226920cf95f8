/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check, shutdown
/// - `migrations`: embedded schema migrations
///
/// The store implementation that uses the pool lives in
/// [`crate::store::postgres`].
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

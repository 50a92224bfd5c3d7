pub mod queries;

use anyhow::Context;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use queries::categories::Category;
pub use queries::questions::Question;

use crate::configuration::DatabaseSettings;

pub async fn establish_connection(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let mut options = SqlitePoolOptions::new().max_connections(settings.max_connections);
    if settings.is_in_memory() {
        // the database lives only as long as its connection
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    options
        .connect_with(settings.connect_options()?)
        .await
        .with_context(|| format!("Cannot connect to database {}", settings.name))
}

/// Creates the `categories` and `questions` tables if they are missing.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = establish_connection(&DatabaseSettings::in_memory())
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

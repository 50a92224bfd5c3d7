use anyhow::Context;
use trivia_api::configuration::get_configuration;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::{server::app::run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = get_configuration().context("Failed to read configuration")?;
    let pool = establish_connection(&settings.database).await?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await?;

    let served = run_server(pool.clone(), &settings.application).await;
    pool.close().await;
    served
}

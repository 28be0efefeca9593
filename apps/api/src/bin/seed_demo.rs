use api::config::Config;
use api::telemetry::init_tracing;
use infrastructure::seed::seed_demo_data;
use migration::{Migrator, MigratorTrait};

/// Loads the demo driver, parent, van, child and location. Safe to run twice.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let db = infrastructure::database::init_database(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let report = seed_demo_data(&db).await?;
    tracing::info!(?report, "Demo data ready");
    Ok(())
}

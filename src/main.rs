use dotenvy::dotenv;
use milkman::{
    config::{database, settings},
    core::{delivery_run, seed},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings (a missing file means defaults)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure every table exists
    let database_url = database::get_database_url(settings.database_url.as_deref());
    database::ensure_database_dir(&database_url)?;
    let db = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Connected to {}", database_url))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the configured catalog
    seed::seed_catalog(&db, &settings)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Today's subscription deliveries
    if settings.delivery.run_on_startup {
        let today = chrono::Utc::now().date_naive();
        if let Some(result) = delivery_run::process_daily_deliveries(&db, today).await? {
            for (subscription_id, reason) in &result.failures {
                error!("Subscription {} not delivered: {}", subscription_id, reason);
            }
        }
    }

    info!("Startup complete");
    Ok(())
}

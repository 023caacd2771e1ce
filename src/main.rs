use anyhow::Context;
use oxidesk_sla::bootstrap;
use oxidesk_sla::config::Config;
use oxidesk_sla::infrastructure::{
    observability, persistence::Database, runtime::TokioTimeService,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    observability::init(&config).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded (business offset {})", config.business_offset);

    // Initialize database connection
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await.context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    let state = bootstrap::build_app_state(db, &config, Arc::new(TokioTimeService::new()));

    match state.contexts.snapshot().await {
        Ok(snapshot) => tracing::info!(
            "Operational hours loaded ({} holiday entries on the calendar)",
            snapshot.holidays.len()
        ),
        Err(e) => tracing::warn!("Operational hours not available yet: {}", e),
    }

    tokio::select! {
        _ = state.holiday_worker.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use task_manager::app_env::AppConfig;
use task_manager::{SharedData, build_router, logging, persistence};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Not every environment ships a .env file
    let _ = dotenv();

    let config = AppConfig::from_env()?;
    let env_filter = logging::init_env_filter()?;
    let otel_exporters = config
        .otel
        .as_ref()
        .map(logging::init_exporters)
        .transpose()?;
    logging::setup_logging_and_tracing(env_filter, otel_exporters)?;

    info!("Connecting to the task store");
    let db = persistence::connect_sqlx(&config.database_url)
        .await
        .context("connecting to the database")?;
    persistence::run_migrations(&db)
        .await
        .context("migrating the database")?;

    let router = build_router(Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db),
        auth_user_header: config.auth_user_header,
    }));

    let listener = TcpListener::bind(config.server_address)
        .await
        .with_context(|| format!("binding to {}", config.server_address))?;
    info!(address = %config.server_address, "Starting server");
    axum::serve(listener, router).await?;

    Ok(())
}

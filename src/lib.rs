pub mod api;
pub mod composer;
pub mod config;
pub mod core_state;
pub mod db;
pub mod dispatch;
pub mod intelligence;
pub mod models;
pub mod orchestrator;
pub mod policy;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::core_state::CoreState;
use crate::db::Database;

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = serve() {
        tracing::error!("{} failed: {e}", config::APP_NAME);
        std::process::exit(1);
    }
}

fn serve() -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    tracing::info!(db = %settings.db_path.display(), "Opening database");
    let db = Database::open(&settings.db_path).map_err(|e| e.to_string())?;

    let bind_addr = settings.bind_addr;
    let core = Arc::new(CoreState::build(settings, db).map_err(|e| e.to_string())?);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {e}"))?;

    runtime.block_on(async move {
        let server = api::start_api_server(core, bind_addr).await?;
        tracing::info!(addr = %server.session.server_addr, "Ready");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for shutdown signal: {e}");
        }
        server.stop().await;
        Ok(())
    })
}

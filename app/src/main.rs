mod config;
mod error;
mod logging;
mod models;
mod rest;
mod service;
mod store;

use config::Config;
use service::IrrigationService;
use store::Store;
use tracing::info;

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        core = irrigation_core::CORE_VERSION,
        "Starting irrigation backend"
    );

    let store = Store::connect(config.database_url()).await?;
    if store.ensure_initialized().await? {
        info!("Created database schema at {}", config.database_url());
    }

    let service = IrrigationService::new(store, &config);
    rest::dispatch_server(service, config.bind_addr()).await?;
    Ok(())
}

use std::sync::Arc;

use dotenvy::dotenv;
use envconfig::Envconfig;
use gestion_stock::{
    config::Config,
    db::{init_db, store::SqliteStore},
    handlers::{self, AppState},
    services::{monitor::StockMonitor, MedicinService, StockService},
};

type Error = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the stock service...");

    let config = Config::init_from_env()?;
    let allowed_origin = config.allowed_origin()?;

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let medicins = MedicinService::new(store.clone(), store.clone());
    let stock = StockService::new(store.clone(), store.clone(), store.clone(), store);

    let mut scheduler = match &config.stock_check_cron {
        Some(cron) => {
            let monitor =
                StockMonitor::new(medicins.clone(), stock.clone(), config.expiry_window_days);
            Some(monitor.schedule(cron).await?)
        }
        None => None,
    };

    let app = handlers::router(AppState { medicins, stock }, allowed_origin);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            log::error!("Failed to stop the stock monitor: {}", e);
        }
    }

    log::info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

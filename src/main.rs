use std::sync::Arc;

use tracing::info;

use crm_importer::infrastructure::config::AppConfig;
use crm_importer::infrastructure::db::SqliteImportStore;
use crm_importer::interfaces::http::start_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .try_init();

    let config = AppConfig::load().map_err(to_io_error)?;
    info!(database_url = %config.database_url, "configuration loaded");

    let store = SqliteImportStore::init(&config.database_url)
        .await
        .map_err(to_io_error)?;

    start_server(config, Arc::new(store))?.await
}

fn to_io_error(err: crm_importer::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

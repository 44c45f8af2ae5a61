use std::sync::Arc;
use std::time::Duration;

use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use tera::Tera;
use thiserror::Error;

use pushkind_catalog_sync::db::{establish_connection_pool, run_migrations};
use pushkind_catalog_sync::domain::types::{CatalogUrl, CategoryId, TypeConstraintError};
use pushkind_catalog_sync::models::config::ServerConfig;
use pushkind_catalog_sync::queue::{TokioTaskQueue, run_consumer, run_schedule};
use pushkind_catalog_sync::repository::DieselRepository;
use pushkind_catalog_sync::routes::api::{
    api_v1_delete_product, api_v1_import_product, api_v1_restart, api_v1_sync,
};
use pushkind_catalog_sync::routes::main::index;
use pushkind_catalog_sync::routes::{AdminState, SyncBackend};
use pushkind_catalog_sync::services::SyncSettings;
use pushkind_catalog_sync::services::catalog::HttpCatalogClient;
use pushkind_catalog_sync::services::dispatch::SyncWorker;
use pushkind_catalog_sync::services::images::{FsMediaStorage, HttpImageImporter};
use pushkind_catalog_sync::services::main::STORE_UNAVAILABLE_NOTICE;

#[derive(Debug, Error)]
enum StartupError {
    #[error("database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("migrations: {0}")]
    Migrations(String),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("configuration: {0}")]
    Config(#[from] TypeConstraintError),
    #[error("uploads directory: {0}")]
    Uploads(#[from] std::io::Error),
}

/// Open the product store and start the queue consumer and import schedule.
fn start_backend(config: &ServerConfig) -> Result<SyncBackend, StartupError> {
    let pool = establish_connection_pool(&config.database_url)?;
    let mut conn = pool.get()?;
    run_migrations(&mut conn).map_err(|e| StartupError::Migrations(e.to_string()))?;
    drop(conn);

    let repo = DieselRepository::new(pool);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let catalog = HttpCatalogClient::new(
        CatalogUrl::new(config.catalog_url.as_str())?,
        config.accept_invalid_certs,
        timeout,
    )?;

    let storage = FsMediaStorage::new(&config.uploads_dir, &config.uploads_url);
    std::fs::create_dir_all(storage.root())?;
    let image_client = reqwest::Client::builder().timeout(timeout).build()?;
    let images = HttpImageImporter::new(image_client, repo.clone(), storage);

    let settings = SyncSettings {
        category_id: CategoryId::new(config.category_id)?,
        restart_remote_after: chrono::Duration::seconds(config.restart_remote_after_secs),
    };

    let (queue, receiver) = TokioTaskQueue::new();
    let worker = SyncWorker::new(repo.clone(), catalog, images, queue.clone(), settings);

    tokio::spawn(run_consumer(receiver, Arc::new(worker)));
    tokio::spawn(run_schedule(
        queue.clone(),
        Duration::from_secs(config.sync_interval_secs.max(1)),
    ));

    log::info!(
        "Catalog sync started: {} every {}s",
        config.catalog_url,
        config.sync_interval_secs
    );

    Ok(SyncBackend { repo, queue })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load server config: {e}");
            std::process::exit(1);
        }
    };

    let tera = match Tera::new(&server_config.templates_glob) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    if server_config.admin_token.is_empty() {
        log::warn!("APP_ADMIN_TOKEN is not set; the /api routes will reject every call");
    }

    let backend = match start_backend(&server_config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            log::error!("{STORE_UNAVAILABLE_NOTICE} ({e})");
            None
        }
    };

    let state = web::Data::new(AdminState {
        backend,
        catalog_url: server_config.catalog_url.clone(),
        sync_interval_secs: server_config.sync_interval_secs,
        admin_token: Some(server_config.admin_token.clone()).filter(|token| !token.is_empty()),
    });
    let tera = web::Data::new(tera);
    let uploads_url = server_config.uploads_url.clone();
    let uploads_dir = server_config.uploads_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(tera.clone())
            .service(Files::new(&uploads_url, &uploads_dir))
            .service(
                web::scope("/api")
                    .service(api_v1_sync)
                    .service(api_v1_restart)
                    .service(api_v1_import_product)
                    .service(api_v1_delete_product),
            )
            .service(index)
    })
    .bind((server_config.address.as_str(), server_config.port))?
    .run()
    .await
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Configuration options of the catalog sync service.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Address the admin server binds to.
    pub address: String,
    pub port: u16,
    /// Remote catalog endpoint.
    pub catalog_url: String,
    /// Skip TLS certificate verification when fetching the catalog.
    pub accept_invalid_certs: bool,
    /// Timeout of a single catalog or image request, in seconds.
    pub request_timeout_secs: u64,
    /// Period of the recurring import, in seconds.
    pub sync_interval_secs: u64,
    /// Delay before retrying after the catalog was unreachable, in seconds.
    pub restart_remote_after_secs: i64,
    /// Category every synced product is filed under.
    pub category_id: i32,
    /// Directory downloaded images are written to.
    pub uploads_dir: String,
    /// Public URL prefix of `uploads_dir`.
    pub uploads_url: String,
    /// Glob of the admin templates.
    pub templates_glob: String,
    /// Bearer token of the `/api` routes. Empty keeps the API locked.
    pub admin_token: String,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, then `config/<APP_ENV>.yaml`, then `APP_*`
    /// environment variables. Every file is optional.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Config::builder()
            .set_default("database_url", "app.db")?
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("catalog_url", "https://wp.webspark.dev/wp-api/products")?
            .set_default("accept_invalid_certs", true)?
            .set_default("request_timeout_secs", 30)?
            .set_default("sync_interval_secs", 3600)?
            .set_default("restart_remote_after_secs", 60)?
            .set_default("category_id", 16)?
            .set_default("uploads_dir", "uploads")?
            .set_default("uploads_url", "/uploads")?
            .set_default("templates_glob", "templates/**/*")?
            .set_default("admin_token", "")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}

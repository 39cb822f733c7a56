use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use billtrust::config::{Config, DatabaseConfig, LogFormat, StorageBackend};
use billtrust::middleware::RequestLogger;
use billtrust::{AppServices, MemoryStore};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("billtrust={},actix_web=info", config.app.log_level))
    });
    let json_layer = (config.app.log_format == LogFormat::Json).then(|| fmt::layer().json());
    let pretty_layer = (config.app.log_format == LogFormat::Pretty).then(fmt::layer);
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!("Starting Billtrust bill computation service");
    tracing::info!(env = %config.app.env, backend = ?config.app.storage_backend, "Configuration loaded");

    let services = match (config.app.storage_backend, &config.database) {
        (StorageBackend::Mysql, Some(database)) => {
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;
            tracing::info!(
                max_connections = database.max_connections,
                "Database pool initialized"
            );

            if database.run_migrations {
                DatabaseConfig::migrate(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            AppServices::mysql(pool, config.defaults)
        }
        (StorageBackend::Mysql, None) => {
            anyhow::bail!("MySQL storage selected without DATABASE_URL")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            AppServices::in_memory(Arc::new(MemoryStore::new()), config.defaults)
        }
    };

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(RequestLogger)
            .wrap(TracingLogger::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("Server terminated with an error")
}

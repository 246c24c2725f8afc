use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};

use agendatico_app::app::api::routes;
use agendatico_app::config::ConfigHandler;
use agendatico_app::db_handler::DbProviderHandler;
use agendatico_app::image_handler::ImageStoreHandler;
use agendatico_core::config::load_config;
use agendatico_db::db::connection::create_pool;
use agendatico_service::storage::ImageStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Agendatico events API");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(config.database.url.clone()).await?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let images = Arc::new(ImageStore::new(config.storage.image_dir.clone()));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler { provider: pool })
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .hoop(ImageStoreHandler { images })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}

/// Applies pending schema migrations over a blocking connection before the
/// async pool comes up.
async fn run_migrations(database_url: String) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;
        use diesel_migrations::MigrationHarness;

        let mut conn = diesel::PgConnection::establish(&database_url)?;
        let applied = conn
            .run_pending_migrations(agendatico_db::MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("migrations failed: {e}"))?;

        tracing::info!(applied = applied.len(), "Schema migrations up to date");
        Ok(())
    })
    .await?
}

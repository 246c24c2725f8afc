//! Writes the sitemap file. Run from cron or after deploys.

use agendatico_core::config::load_config;
use agendatico_db::db::connection::create_pool;
use agendatico_service::sitemap::write_sitemap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;
    let mut conn = pool.get().await?;

    let count = write_sitemap(
        &mut conn,
        &config.server.origin(),
        chrono::Utc::now(),
        &config.storage.sitemap_path,
    )
    .await?;

    println!(
        "Sitemap generated with {count} URLs at {}",
        config.storage.sitemap_path
    );

    Ok(())
}

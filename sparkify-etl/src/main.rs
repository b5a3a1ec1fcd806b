use sparkify_core::sink::{MemoryDatabase, PgDatabase};
use sparkify_etl::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkify_etl=info,sparkify_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if config.dry_run {
        tracing::info!("Dry run: loading into memory, the warehouse is not touched");
        let db = MemoryDatabase::new();
        sparkify_etl::run(db.clone(), &config).await?;

        let tables = db.snapshot();
        tracing::info!(
            songs = tables.songs.len(),
            artists = tables.artists.len(),
            time = tables.time.len(),
            users = tables.users.len(),
            songplays = tables.songplays.len(),
            "Dry run table counts"
        );
        if let Some(play) = tables.songplays.first() {
            tracing::debug!("First songplay: {}", serde_json::to_string(play)?);
        }
        return Ok(());
    }

    let db = PgDatabase::connect(&config.database_url).await?;
    sparkify_etl::run(db, &config).await?;

    Ok(())
}

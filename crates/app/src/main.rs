use chrono::Duration;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;
mod sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "sadaqah={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    if settings.sweeper.enabled {
        let engine = engine::Engine::builder().database(db.clone()).build().await?;
        let hold = Duration::days(settings.sweeper.hold_days);
        let handle = sweeper::start_sweeper(engine, settings.sweeper.interval_hours, hold);
        tasks.spawn(async move {
            if let Err(err) = handle.await {
                tracing::error!("sweeper stopped: {err}");
            }
        });
    } else {
        tracing::info!("stale item sweeper disabled");
    }

    let engine = engine::Engine::builder().database(db).build().await?;
    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

pub mod entity;
pub mod logs_repo;
pub mod mapper;
pub mod migrations;
pub mod seed;
pub mod users_repo;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Open a pool for `url`.
///
/// An in-memory SQLite database lives as long as its connection, so such a
/// pool is pinned to exactly one connection regardless of `max_conns`.
pub async fn connect(url: &str, max_conns: Option<u32>) -> anyhow::Result<DatabaseConnection> {
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");
    let mut opts = ConnectOptions::new(url.to_owned());
    if in_memory {
        opts.max_connections(1).min_connections(1);
    } else if let Some(n) = max_conns {
        opts.max_connections(n);
    }
    opts.sqlx_logging(false);

    debug!(in_memory, "Connecting to database");
    let conn = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to database '{url}'"))?;
    info!("Database connection established");
    Ok(conn)
}

pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running user_management database migrations");
    migrations::Migrator::up(conn, None)
        .await
        .context("migrations failed")?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Fresh migrated in-memory store.
pub async fn open_in_memory() -> anyhow::Result<DatabaseConnection> {
    let conn = connect(IN_MEMORY_URL, None).await?;
    migrate(&conn).await?;
    Ok(conn)
}

//! SQLite persistence for the entity catalog

pub mod entities;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open (creating if needed) the database and its tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the entities table if it doesn't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            culture TEXT NOT NULL,
            traits TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            traditions TEXT NOT NULL DEFAULT '',
            references_list TEXT NOT NULL DEFAULT '',
            affected_genders TEXT NOT NULL DEFAULT '',
            affected_age_groups TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (entities)");

    Ok(())
}

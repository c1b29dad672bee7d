//! Database module for SQLite persistence.
//!
//! SQLite stands in for both external stores: the RSVP sheet is kept as a
//! sparse cell table, and the photo folder as a file table.

mod drive;
mod sheet;

pub use drive::*;
pub use sheet::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            revision_id INTEGER NOT NULL DEFAULT 0,
            last_modified TEXT NOT NULL
        );

        INSERT OR IGNORE INTO meta (id, revision_id, last_modified)
        VALUES (1, 0, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sheet_cells (
            row_idx INTEGER NOT NULL,
            col_idx INTEGER NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (row_idx, col_idx)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drive_files (
            id TEXT PRIMARY KEY,
            folder_id TEXT NOT NULL,
            name TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            size INTEGER NOT NULL,
            data BLOB NOT NULL,
            public INTEGER NOT NULL DEFAULT 0,
            last_modified TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_drive_files_folder ON drive_files(folder_id);
        CREATE INDEX IF NOT EXISTS idx_drive_files_last_modified ON drive_files(last_modified);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

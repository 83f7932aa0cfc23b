//! Database initialization
//!
//! Creates the item and decision tables on first run. Safe to call on every
//! startup: all statements are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while one writer holds the lock,
    // which is the normal shape of traffic here: many reviewers polling,
    // one lease transition at a time.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_items_table(pool).await?;
    create_decisions_table(pool).await?;
    Ok(())
}

/// Create the items table
///
/// The CHECK constraint ties the lease fields to the status: they are
/// non-null exactly while the item is leased.
pub async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            metadata TEXT,
            existing_code TEXT,
            existing_label TEXT,
            model_code TEXT,
            model_label TEXT,
            confidence_score REAL NOT NULL DEFAULT 0.0,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'leased', 'completed', 'escalated')),
            queue TEXT NOT NULL DEFAULT 'high_confidence',
            leased_by TEXT,
            leased_at TEXT,
            created_at TEXT NOT NULL,
            CHECK (
                (status = 'leased' AND leased_by IS NOT NULL AND leased_at IS NOT NULL)
                OR (status != 'leased' AND leased_by IS NULL AND leased_at IS NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_status_queue ON items(status, queue)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_leased_by ON items(leased_by)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_leased_at ON items(leased_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the decisions table
///
/// Append-only audit log; rows are never updated or deleted.
pub async fn create_decisions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS decisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id TEXT NOT NULL REFERENCES items(id),
            reviewer_id TEXT NOT NULL,
            action TEXT NOT NULL CHECK (action IN ('accept', 'fix', 'escalate')),
            final_code TEXT NOT NULL,
            escalation_reason TEXT,
            time_spent_ms INTEGER NOT NULL DEFAULT 0 CHECK (time_spent_ms >= 0),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_decisions_item_id ON decisions(item_id)")
        .execute(pool)
        .await?;

    Ok(())
}

//! Shared test helpers
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create a file-backed test database with the full schema
///
/// File-backed rather than in-memory so concurrent connections from the
/// pool all see the same store.
pub async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = revq_common::db::init_database(&dir.path().join("revq.db"))
        .await
        .unwrap();
    (dir, pool)
}

pub async fn seed_item(pool: &SqlitePool, id: &str, queue: &str, created_at: DateTime<Utc>) {
    sqlx::query("INSERT INTO items (id, description, queue, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(format!("description of {}", id))
        .bind(queue)
        .bind(created_at.to_rfc3339())
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_leased_item(
    pool: &SqlitePool,
    id: &str,
    reviewer_id: &str,
    leased_at: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO items (id, description, status, leased_by, leased_at, created_at) VALUES (?, ?, 'leased', ?, ?, ?)",
    )
    .bind(id)
    .bind(format!("description of {}", id))
    .bind(reviewer_id)
    .bind(leased_at.to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .unwrap();
}

pub async fn seed_item_with_status(pool: &SqlitePool, id: &str, status: &str) {
    sqlx::query("INSERT INTO items (id, description, status, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(format!("description of {}", id))
        .bind(status)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .unwrap();
}

pub async fn status_of(pool: &SqlitePool, id: &str) -> String {
    sqlx::query_scalar("SELECT status FROM items WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn decision_count(pool: &SqlitePool, item_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM decisions WHERE item_id = ?")
        .bind(item_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Lease fields must be non-null exactly while an item is leased
pub async fn assert_lease_invariant(pool: &SqlitePool) {
    let violations: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM items WHERE (status = 'leased') != (leased_by IS NOT NULL AND leased_at IS NOT NULL)",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(violations, 0, "lease field invariant violated");
}

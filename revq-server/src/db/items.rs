//! Item store operations: leasing, lookup, and lease recovery
//!
//! Every state change is a single UPDATE guarded by the expected current
//! state. Concurrent callers race safely: exactly one write wins and the
//! losers observe `rows_affected() == 0`.

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use revq_common::models::{Item, ItemStatus};
use revq_common::{Error, Result};

/// Candidate retries before an acquire gives up under heavy contention
const MAX_LEASE_ATTEMPTS: usize = 5;

const SELECT_ITEM: &str = r#"
    SELECT id, description, metadata, existing_code, existing_label,
           model_code, model_label, confidence_score, status, queue,
           leased_by, leased_at, created_at
    FROM items
"#;

/// Fetch a single item by id
pub async fn get_item(pool: &SqlitePool, item_id: &str) -> Result<Option<Item>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ITEM))
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(item_from_row).transpose()
}

/// Return the item currently leased by a reviewer, if any
pub async fn find_active_lease(pool: &SqlitePool, reviewer_id: &str) -> Result<Option<Item>> {
    let row = sqlx::query(&format!(
        "{} WHERE status = 'leased' AND leased_by = ? LIMIT 1",
        SELECT_ITEM
    ))
    .bind(reviewer_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(item_from_row).transpose()
}

/// Return the reviewer's current work item, leasing the next pending one
/// if they do not already hold a lease
///
/// Selection is oldest `created_at` first with `id` as the tiebreak. The
/// lease itself is a compare-and-set on `status = 'pending'`: when two
/// reviewers race for the same row, exactly one update wins and the loser
/// moves on to the next candidate. The update also refuses to create a
/// second lease for a reviewer re-polling concurrently.
pub async fn acquire_next(
    pool: &SqlitePool,
    reviewer_id: &str,
    queue: Option<&str>,
) -> Result<Option<Item>> {
    for _ in 0..MAX_LEASE_ATTEMPTS {
        // An in-progress lease is always returned as-is, so re-polling
        // never advances a reviewer past their current item.
        if let Some(item) = find_active_lease(pool, reviewer_id).await? {
            return Ok(Some(item));
        }

        let candidate: Option<String> = match queue {
            Some(queue) => {
                sqlx::query_scalar(
                    "SELECT id FROM items WHERE status = 'pending' AND queue = ? ORDER BY created_at, id LIMIT 1",
                )
                .bind(queue)
                .fetch_optional(pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM items WHERE status = 'pending' ORDER BY created_at, id LIMIT 1",
                )
                .fetch_optional(pool)
                .await?
            }
        };

        let Some(item_id) = candidate else {
            return Ok(None);
        };

        let result = sqlx::query(
            r#"
            UPDATE items
            SET status = 'leased', leased_by = ?, leased_at = ?
            WHERE id = ? AND status = 'pending'
              AND NOT EXISTS (SELECT 1 FROM items WHERE status = 'leased' AND leased_by = ?)
            "#,
        )
        .bind(reviewer_id)
        .bind(Utc::now().to_rfc3339())
        .bind(&item_id)
        .bind(reviewer_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            info!(item_id = %item_id, reviewer_id = %reviewer_id, "Lease acquired");
            return get_item(pool, &item_id).await;
        }

        // Another caller won this row (or leased to us first); re-check.
        debug!(item_id = %item_id, reviewer_id = %reviewer_id, "Lost lease race, retrying");
    }

    Err(Error::Conflict(
        "lease contention too high, try again".to_string(),
    ))
}

/// Release one leased item back to pending
///
/// Returns `None` when the item does not exist or is not leased; releasing
/// an already-released item is a no-op, not an error.
pub async fn release_one(pool: &SqlitePool, item_id: &str) -> Result<Option<Item>> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE items SET status = 'pending', leased_by = NULL, leased_at = NULL WHERE id = ? AND status = 'leased'",
    )
    .bind(item_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ITEM))
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;
    let item = item_from_row(&row)?;

    tx.commit().await?;

    info!(item_id = %item_id, "Lease released");
    Ok(Some(item))
}

/// Release every leased item back to pending, returning the count affected
pub async fn release_all(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE items SET status = 'pending', leased_by = NULL, leased_at = NULL WHERE status = 'leased'",
    )
    .execute(pool)
    .await?;

    let count = result.rows_affected();
    info!(count, "Released all leases");
    Ok(count)
}

/// Release leases held strictly longer than `max_age`, returning the count
///
/// This is the recovery path for reviewers who crashed or abandoned a tab
/// without submitting a decision. Scheduling is owned by an external
/// caller; the operation itself is a single bounded sweep.
pub async fn release_stale(pool: &SqlitePool, max_age: Duration) -> Result<u64> {
    let cutoff = Utc::now() - max_age;

    let result = sqlx::query(
        "UPDATE items SET status = 'pending', leased_by = NULL, leased_at = NULL WHERE status = 'leased' AND leased_at < ?",
    )
    .bind(cutoff.to_rfc3339())
    .execute(pool)
    .await?;

    let count = result.rows_affected();
    if count > 0 {
        info!(count, "Released stale leases");
    }
    Ok(count)
}

/// Return every escalated item to pending for a second review round
pub async fn requeue_escalated(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("UPDATE items SET status = 'pending' WHERE status = 'escalated'")
        .execute(pool)
        .await?;

    let count = result.rows_affected();
    info!(count, "Requeued escalated items");
    Ok(count)
}

pub(crate) fn item_from_row(row: &SqliteRow) -> Result<Item> {
    let status: String = row.get("status");

    let metadata: Option<String> = row.get("metadata");
    let metadata = metadata
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| Error::Internal(format!("Malformed item metadata: {}", e)))?;

    let leased_at: Option<String> = row.get("leased_at");
    let leased_at = leased_at.map(|raw| parse_timestamp(&raw)).transpose()?;

    let created_at: String = row.get("created_at");

    Ok(Item {
        id: row.get("id"),
        description: row.get("description"),
        metadata,
        existing_code: row.get("existing_code"),
        existing_label: row.get("existing_label"),
        model_code: row.get("model_code"),
        model_label: row.get("model_label"),
        confidence_score: row.get("confidence_score"),
        status: ItemStatus::parse(&status)?,
        queue: row.get("queue"),
        leased_by: row.get("leased_by"),
        leased_at,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Malformed timestamp {:?}: {}", raw, e)))
}

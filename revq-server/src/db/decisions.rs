//! Decision recording
//!
//! Appends the audit row and finalizes the item in one transaction, so a
//! crash can never leave a leased item with an orphaned decision or a
//! decision without its state change.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

use revq_common::models::{Decision, DecisionAction, Item, ItemStatus, NewDecision};
use revq_common::{Error, Result};

use super::items::{item_from_row, parse_timestamp};

/// Record a reviewer's verdict and transition the item out of review
///
/// The item must exist, be leased, and be leased by the submitting
/// reviewer. `escalate` moves it to `escalated`, any other action to
/// `completed`; both clear the lease fields.
pub async fn submit(pool: &SqlitePool, decision: &NewDecision) -> Result<(Item, Decision)> {
    let mut tx = pool.begin().await?;

    let current: Option<(String, Option<String>)> =
        sqlx::query_as("SELECT status, leased_by FROM items WHERE id = ?")
            .bind(&decision.item_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((status, leased_by)) = current else {
        return Err(Error::NotFound(format!("Item not found: {}", decision.item_id)));
    };
    if status != ItemStatus::Leased.as_str() {
        return Err(Error::Conflict(format!(
            "Item {} is not under review (status: {})",
            decision.item_id, status
        )));
    }
    if leased_by.as_deref() != Some(decision.reviewer_id.as_str()) {
        return Err(Error::Conflict(format!(
            "Item {} is leased by another reviewer",
            decision.item_id
        )));
    }

    let now = Utc::now();
    let insert = sqlx::query(
        r#"
        INSERT INTO decisions (item_id, reviewer_id, action, final_code, escalation_reason, time_spent_ms, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&decision.item_id)
    .bind(&decision.reviewer_id)
    .bind(decision.action.as_str())
    .bind(&decision.final_code)
    .bind(&decision.escalation_reason)
    .bind(decision.time_spent_ms)
    .bind(now.to_rfc3339())
    .execute(&mut *tx)
    .await?;
    let decision_id = insert.last_insert_rowid();

    let next_status = decision.action.resulting_status();
    let updated = sqlx::query(
        "UPDATE items SET status = ?, leased_by = NULL, leased_at = NULL WHERE id = ? AND status = 'leased' AND leased_by = ?",
    )
    .bind(next_status.as_str())
    .bind(&decision.item_id)
    .bind(&decision.reviewer_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Item {} changed state during submit",
            decision.item_id
        )));
    }

    let row = sqlx::query(
        r#"
        SELECT id, description, metadata, existing_code, existing_label,
               model_code, model_label, confidence_score, status, queue,
               leased_by, leased_at, created_at
        FROM items
        WHERE id = ?
        "#,
    )
    .bind(&decision.item_id)
    .fetch_one(&mut *tx)
    .await?;
    let item = item_from_row(&row)?;

    tx.commit().await?;

    info!(
        item_id = %decision.item_id,
        reviewer_id = %decision.reviewer_id,
        action = decision.action.as_str(),
        decision_id,
        "Decision recorded"
    );

    Ok((
        item,
        Decision {
            id: decision_id,
            item_id: decision.item_id.clone(),
            reviewer_id: decision.reviewer_id.clone(),
            action: decision.action,
            final_code: decision.final_code.clone(),
            escalation_reason: decision.escalation_reason.clone(),
            time_spent_ms: decision.time_spent_ms,
            created_at: now,
        },
    ))
}

/// List the review history for an item, oldest first
pub async fn list_for_item(pool: &SqlitePool, item_id: &str) -> Result<Vec<Decision>> {
    let rows = sqlx::query(
        r#"
        SELECT id, item_id, reviewer_id, action, final_code,
               escalation_reason, time_spent_ms, created_at
        FROM decisions
        WHERE item_id = ?
        ORDER BY id
        "#,
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let action: String = row.get("action");
            let created_at: String = row.get("created_at");
            Ok(Decision {
                id: row.get("id"),
                item_id: row.get("item_id"),
                reviewer_id: row.get("reviewer_id"),
                action: DecisionAction::parse(&action)?,
                final_code: row.get("final_code"),
                escalation_reason: row.get("escalation_reason"),
                time_spent_ms: row.get("time_spent_ms"),
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}

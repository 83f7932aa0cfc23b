//! Best-effort export of review results
//!
//! Writes the downstream report consumed by the surrounding tooling: a CSV
//! of every item joined with its most recent decision, plus a JSON summary
//! of status counts. Callers treat failures as log-and-continue; the
//! decision that triggered the export is already committed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use sqlx::{Row, SqlitePool};

use revq_common::{Error, Result};

const RESULTS_FILE: &str = "validation_results.csv";
const SUMMARY_FILE: &str = "summary.json";

/// Export current item and decision state into `export_dir`
pub async fn export_results(pool: &SqlitePool, export_dir: &Path) -> Result<()> {
    fs::create_dir_all(export_dir)?;

    let rows = sqlx::query(
        r#"
        SELECT i.id, i.description, i.existing_code, i.model_code, i.status,
               d.final_code, d.action, d.reviewer_id,
               d.created_at AS reviewed_at, d.escalation_reason
        FROM items i
        LEFT JOIN decisions d ON d.id = (
            SELECT MAX(d2.id) FROM decisions d2 WHERE d2.item_id = i.id
        )
        ORDER BY i.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut csv = String::from(
        "id,description,existing_code,model_code,status,final_code,action,reviewer_id,reviewed_at,escalation_reason\n",
    );
    for row in &rows {
        let fields = [
            row.get::<String, _>("id"),
            row.get::<String, _>("description"),
            row.get::<Option<String>, _>("existing_code").unwrap_or_default(),
            row.get::<Option<String>, _>("model_code").unwrap_or_default(),
            row.get::<String, _>("status"),
            row.get::<Option<String>, _>("final_code").unwrap_or_default(),
            row.get::<Option<String>, _>("action").unwrap_or_default(),
            row.get::<Option<String>, _>("reviewer_id").unwrap_or_default(),
            row.get::<Option<String>, _>("reviewed_at").unwrap_or_default(),
            row.get::<Option<String>, _>("escalation_reason").unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    fs::write(export_dir.join(RESULTS_FILE), csv)?;

    let counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM items GROUP BY status")
            .fetch_all(pool)
            .await?;
    let counts: HashMap<String, i64> = counts.into_iter().collect();
    let total: i64 = counts.values().sum();

    let summary = json!({
        "total_items": total,
        "pending": counts.get("pending").copied().unwrap_or(0),
        "leased": counts.get("leased").copied().unwrap_or(0),
        "completed": counts.get("completed").copied().unwrap_or(0),
        "escalated": counts.get("escalated").copied().unwrap_or(0),
        "last_updated": Utc::now().to_rfc3339(),
    });
    let summary = serde_json::to_string_pretty(&summary)
        .map_err(|e| Error::Internal(format!("Failed to serialize summary: {}", e)))?;
    fs::write(export_dir.join(SUMMARY_FILE), summary)?;

    Ok(())
}

/// Quote a CSV field only when it needs it
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

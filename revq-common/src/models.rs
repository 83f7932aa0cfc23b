//! Domain models for review items and decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifecycle state of a review item
///
/// Transitions are driven only by the lease, decision, and recovery
/// operations. `completed` is terminal; `escalated` items can be returned
/// to `pending` for a second review round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Leased,
    Completed,
    Escalated,
}

impl ItemStatus {
    /// Database representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Leased => "leased",
            ItemStatus::Completed => "completed",
            ItemStatus::Escalated => "escalated",
        }
    }

    /// Parse a status stored in the database
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ItemStatus::Pending),
            "leased" => Ok(ItemStatus::Leased),
            "completed" => Ok(ItemStatus::Completed),
            "escalated" => Ok(ItemStatus::Escalated),
            other => Err(Error::Internal(format!("Unknown item status: {}", other))),
        }
    }
}

/// Reviewer verdict on a leased item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Accept,
    Fix,
    Escalate,
}

impl DecisionAction {
    /// Database representation of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Accept => "accept",
            DecisionAction::Fix => "fix",
            DecisionAction::Escalate => "escalate",
        }
    }

    /// Parse an action stored in the database
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "accept" => Ok(DecisionAction::Accept),
            "fix" => Ok(DecisionAction::Fix),
            "escalate" => Ok(DecisionAction::Escalate),
            other => Err(Error::Internal(format!("Unknown decision action: {}", other))),
        }
    }

    /// Item status this action transitions the item into
    pub fn resulting_status(&self) -> ItemStatus {
        match self {
            DecisionAction::Escalate => ItemStatus::Escalated,
            DecisionAction::Accept | DecisionAction::Fix => ItemStatus::Completed,
        }
    }
}

/// A unit of review work
///
/// The payload fields (description, codes, confidence) are immutable inputs
/// set at import time; only `status` and the lease fields change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_label: Option<String>,

    pub confidence_score: f64,

    pub status: ItemStatus,

    /// Static partition label used to filter eligible pending work
    pub queue: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leased_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leased_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Lease fields must be non-null exactly while the item is leased
    pub fn lease_fields_consistent(&self) -> bool {
        (self.status == ItemStatus::Leased)
            == (self.leased_by.is_some() && self.leased_at.is_some())
    }
}

/// Immutable record of a reviewer's verdict
///
/// Append-only: multiple decisions can exist for one item across review
/// rounds, but rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Store-assigned sequence number
    pub id: i64,
    pub item_id: String,
    pub reviewer_id: String,
    pub action: DecisionAction,
    pub final_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,

    pub time_spent_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Submission payload for a new decision (id and timestamp are assigned
/// by the store)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDecision {
    pub item_id: String,
    pub reviewer_id: String,
    pub action: DecisionAction,
    pub final_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,

    #[serde(default)]
    pub time_spent_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            ItemStatus::Pending,
            ItemStatus::Leased,
            ItemStatus::Completed,
            ItemStatus::Escalated,
        ] {
            assert_eq!(ItemStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ItemStatus::parse("locked").is_err());
    }

    #[test]
    fn action_round_trips_through_db_strings() {
        for action in [
            DecisionAction::Accept,
            DecisionAction::Fix,
            DecisionAction::Escalate,
        ] {
            assert_eq!(DecisionAction::parse(action.as_str()).unwrap(), action);
        }
        assert!(DecisionAction::parse("reject").is_err());
    }

    #[test]
    fn escalate_is_the_only_non_completing_action() {
        assert_eq!(
            DecisionAction::Escalate.resulting_status(),
            ItemStatus::Escalated
        );
        assert_eq!(
            DecisionAction::Accept.resulting_status(),
            ItemStatus::Completed
        );
        assert_eq!(DecisionAction::Fix.resulting_status(), ItemStatus::Completed);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&ItemStatus::Escalated).unwrap(),
            "\"escalated\""
        );
        let action: DecisionAction = serde_json::from_str("\"fix\"").unwrap();
        assert_eq!(action, DecisionAction::Fix);
    }

    #[test]
    fn lease_field_consistency() {
        let mut item = Item {
            id: "item-1".to_string(),
            description: "test".to_string(),
            metadata: None,
            existing_code: None,
            existing_label: None,
            model_code: None,
            model_label: None,
            confidence_score: 0.0,
            status: ItemStatus::Pending,
            queue: "high_confidence".to_string(),
            leased_by: None,
            leased_at: None,
            created_at: Utc::now(),
        };
        assert!(item.lease_fields_consistent());

        item.status = ItemStatus::Leased;
        assert!(!item.lease_fields_consistent());

        item.leased_by = Some("r1".to_string());
        item.leased_at = Some(Utc::now());
        assert!(item.lease_fields_consistent());

        item.status = ItemStatus::Completed;
        assert!(!item.lease_fields_consistent());
    }
}

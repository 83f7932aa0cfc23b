//! Database access layer for revq-server
//!
//! The items module owns every state transition of the review lifecycle;
//! the decisions module owns the append-only audit log.

pub mod decisions;
pub mod items;

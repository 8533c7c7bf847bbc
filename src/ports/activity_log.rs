use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Action kinds recorded in the audit trail, one per logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    ItemScanned,
    ScanReset,
    LoanCreated,
    ItemReturned,
    BatchReturned,
    ItemsImported,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ItemScanned => "item_scanned",
            ActivityAction::ScanReset => "scan_reset",
            ActivityAction::LoanCreated => "loan_created",
            ActivityAction::ItemReturned => "item_returned",
            ActivityAction::BatchReturned => "batch_returned",
            ActivityAction::ItemsImported => "items_imported",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "item_scanned" => Ok(ActivityAction::ItemScanned),
            "scan_reset" => Ok(ActivityAction::ScanReset),
            "loan_created" => Ok(ActivityAction::LoanCreated),
            "item_returned" => Ok(ActivityAction::ItemReturned),
            "batch_returned" => Ok(ActivityAction::BatchReturned),
            "items_imported" => Ok(ActivityAction::ItemsImported),
            other => Err(format!("unknown activity action: {}", other)),
        }
    }
}

/// A new audit entry, appended by the services on their success path only.
#[derive(Debug, Clone)]
pub struct NewActivityEntry {
    pub actor: String,
    pub action: ActivityAction,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted audit entry.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: i64,
    pub actor: String,
    pub action: ActivityAction,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ActivityLogError {
    #[error("activity log unavailable")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ActivityLogError>;

/// Activity Log port.
///
/// Append-only: entries are never mutated or deleted by normal operation.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: NewActivityEntry) -> Result<()>;

    /// List the most recent entries, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>>;
}

use crate::domain::{Barcode, Item, ItemStatus, NewItem};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Guard predicate for the conditional status write.
///
/// Scan uses `IsNot(Scanned)` (at-most-once stocktake marking), loan
/// reservation uses `Is(Available)`. The predicate is evaluated and applied
/// as a single atomic statement against the store, never as a separate
/// read-then-write at the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPredicate {
    Is(ItemStatus),
    IsNot(ItemStatus),
}

impl StatusPredicate {
    /// Whether a current status satisfies the predicate.
    pub fn matches(&self, status: ItemStatus) -> bool {
        match self {
            StatusPredicate::Is(expected) => status == *expected,
            StatusPredicate::IsNot(excluded) => status != *excluded,
        }
    }
}

#[derive(Debug, Error)]
pub enum ItemStoreError {
    /// Transport or transaction failure; the operation must be assumed
    /// rolled back.
    #[error("item store unavailable")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ItemStoreError>;

/// Item Store port.
///
/// Owns the Item lifecycle exclusively. The conditional-write primitive is
/// the one thing Scan correctness rests on; everything else is plain reads
/// and the import upsert path.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Look up a single item by barcode.
    async fn get(&self, barcode: &Barcode) -> Result<Option<Item>>;

    /// Conditionally set the status (and scan timestamp) of one item.
    ///
    /// Returns the affected-row count: 1 when the predicate held and the
    /// write was applied, 0 when the row was absent or the predicate failed
    /// (e.g. a concurrent caller got there first).
    async fn compare_and_swap_status(
        &self,
        barcode: &Barcode,
        predicate: StatusPredicate,
        next: ItemStatus,
        scan_timestamp: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64>;

    /// List available items, optionally filtered by a name/barcode search.
    async fn list_available(&self, search: Option<&str>, limit: i64) -> Result<Vec<Item>>;

    /// Upsert-by-barcode import path. Never creates duplicate barcodes;
    /// last write wins on conflicting descriptive fields. The status and
    /// scan timestamp of an existing row are left untouched.
    ///
    /// Returns the number of rows written.
    async fn bulk_upsert(&self, rows: Vec<NewItem>, updated_at: DateTime<Utc>) -> Result<u64>;

    /// Revert Scanned rows to Available and clear their scan timestamp.
    ///
    /// `barcode = None` clears every scanned row. Idempotent bulk clear,
    /// not subject to the scan race guard. Returns the affected-row count.
    async fn reset_scanned(
        &self,
        barcode: Option<&Barcode>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64>;
}

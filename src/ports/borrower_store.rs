use crate::domain::{Borrower, BorrowerId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BorrowerStoreError {
    #[error("borrower store unavailable")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, BorrowerStoreError>;

/// Borrower Store port.
///
/// Borrowers are upserted by their national-ID-like key. Loans keep a
/// denormalized name snapshot, so nothing here cascades into loan history.
#[async_trait]
pub trait BorrowerStore: Send + Sync {
    /// Insert or update a borrower by key (last write wins).
    async fn upsert(&self, borrower: Borrower) -> Result<()>;

    /// Look up a borrower by key.
    async fn get(&self, id: &BorrowerId) -> Result<Option<Borrower>>;
}

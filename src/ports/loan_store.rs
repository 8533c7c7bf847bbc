use crate::domain::{Barcode, BorrowerId, InvoiceNo, Loan, LoanItem};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanStoreError {
    /// An item in the reservation list was absent or not Available.
    /// The whole loan creation rolls back — no partial loans.
    #[error("item {0} is not available for loan")]
    ItemUnavailable(Barcode),

    /// Invoice numbering backstop: the unique constraint on `invoice_no`
    /// fired. Normal allocation is serialized by the counter row, so this
    /// only happens when something raced inside the same commit window.
    #[error("invoice number allocation conflict")]
    InvoiceConflict,

    /// No loan item with this barcode is currently on loan under an open
    /// loan.
    #[error("item is not on loan")]
    NotOnLoan,

    /// Transport or transaction failure; the operation must be assumed
    /// rolled back.
    #[error("loan store unavailable")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, LoanStoreError>;

/// Input to the atomic loan reservation. The invoice number and the loan id
/// are allocated inside the store transaction.
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub borrower_id: BorrowerId,
    pub borrower_name: String,
    pub inputter: String,
    pub program: String,
    pub reason: String,
    pub items: Vec<Barcode>,
    pub due_date: DateTime<Utc>,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a single-item return, committed as one unit.
#[derive(Debug, Clone)]
pub struct ReturnedItem {
    pub loan_item: LoanItem,
    /// Invoice of the parent loan, for audit traceability.
    pub invoice_no: InvoiceNo,
    /// Whether this return closed the parent loan (zero remaining on-loan
    /// items).
    pub loan_completed: bool,
}

/// Loan Store port.
///
/// Owns Loan + LoanItem creation and the return-time reconciliation of
/// LoanItem and Item status. Each method is one ACID transaction: it either
/// commits every write it describes or none of them.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Atomically allocate a per-day invoice number, insert the Loan header
    /// and its LoanItems, and flip every reserved Item from Available to
    /// OnLoan. Fails with `ItemUnavailable` (and rolls back everything) as
    /// soon as one barcode is absent or not Available.
    async fn create_loan(&self, loan: NewLoan) -> Result<Loan>;

    /// Return one item: mark its unique on-loan LoanItem as Returned, set
    /// the Item back to Available (clearing any scan mark), and recompute
    /// the parent loan's completion. Fails with `NotOnLoan` when no open
    /// loan holds the barcode.
    async fn return_item(&self, barcode: &Barcode, returned_at: DateTime<Utc>)
    -> Result<ReturnedItem>;

    /// Fetch a loan with its items by invoice number (read-only).
    async fn get_by_invoice(&self, invoice_no: &InvoiceNo)
    -> Result<Option<(Loan, Vec<LoanItem>)>>;

    /// List open loans, newest first (read-only).
    async fn list_open(&self) -> Result<Vec<Loan>>;
}

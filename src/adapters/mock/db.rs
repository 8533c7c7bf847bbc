use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::domain::{Borrower, Item, Loan, LoanItem};
use crate::ports::ActivityEntry;

/// In-memory state shared by every mock store.
#[derive(Default)]
pub(crate) struct DbState {
    /// Items keyed by barcode.
    pub items: HashMap<String, Item>,
    /// Borrowers keyed by their national-ID-like key.
    pub borrowers: HashMap<String, Borrower>,
    pub loans: Vec<Loan>,
    pub loan_items: Vec<LoanItem>,
    /// Per-day invoice sequence.
    pub invoice_counters: HashMap<NaiveDate, u32>,
    pub activity_entries: Vec<ActivityEntry>,
    pub next_activity_id: i64,
}

/// Shared handle to the in-memory database.
///
/// Every mock store clones this handle, so a single `Mutex` guards the whole
/// state: each port operation runs atomically while holding the lock, which
/// gives the mocks the same all-or-nothing semantics as the authoritative
/// store — without a second divergent backend.
#[derive(Clone, Default)]
pub struct Db {
    state: Arc<Mutex<DbState>>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, DbState> {
        self.state.lock().unwrap()
    }
}

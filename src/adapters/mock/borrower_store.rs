use crate::domain::{Borrower, BorrowerId};
use crate::ports::borrower_store::{BorrowerStore as BorrowerStoreTrait, Result};
use async_trait::async_trait;

use super::db::Db;

/// Mock implementation of BorrowerStore.
///
/// Upsert-by-key over the shared in-memory state.
pub struct BorrowerStore {
    db: Db,
}

impl BorrowerStore {
    pub fn new(db: &Db) -> Self {
        Self { db: db.clone() }
    }
}

#[async_trait]
impl BorrowerStoreTrait for BorrowerStore {
    async fn upsert(&self, borrower: Borrower) -> Result<()> {
        let mut state = self.db.lock();
        state
            .borrowers
            .insert(borrower.id.as_str().to_string(), borrower);
        Ok(())
    }

    async fn get(&self, id: &BorrowerId) -> Result<Option<Borrower>> {
        let state = self.db.lock();
        Ok(state.borrowers.get(id.as_str()).cloned())
    }
}

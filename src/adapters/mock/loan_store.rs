use crate::domain::{
    Barcode, InvoiceNo, ItemStatus, Loan, LoanId, LoanItem, LoanItemId, LoanItemStatus, LoanStatus,
    loan_completed,
};
use crate::ports::loan_store::{
    LoanStore as LoanStoreTrait, LoanStoreError, NewLoan, Result, ReturnedItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::db::Db;

/// LoanStoreのモック実装
///
/// 各メソッドはロック保持中に検証してから書き込むので、本物のストアの
/// トランザクションと同じall-or-nothingになる。
pub struct LoanStore {
    db: Db,
}

impl LoanStore {
    pub fn new(db: &Db) -> Self {
        Self { db: db.clone() }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        let mut state = self.db.lock();

        // 全明細がAvailableであることを先に検証する。1件でも欠けていれば
        // 何も書かずに失敗する（all-or-nothing）
        for barcode in &new_loan.items {
            match state.items.get(barcode.as_str()) {
                Some(item) if item.status == ItemStatus::Available => {}
                _ => return Err(LoanStoreError::ItemUnavailable(barcode.clone())),
            }
        }

        // 日内連番のインクリメント（ロック下なので採番は直列化される）
        let day = new_loan.created_at.date_naive();
        let counter = state.invoice_counters.entry(day).or_insert(0);
        *counter += 1;
        let invoice_no = InvoiceNo::allocate(day, *counter);

        let loan = Loan {
            id: LoanId::new(),
            invoice_no,
            borrower_id: new_loan.borrower_id,
            borrower_name: new_loan.borrower_name,
            inputter: new_loan.inputter,
            program: new_loan.program,
            reason: new_loan.reason,
            due_date: new_loan.due_date,
            signature: new_loan.signature,
            status: LoanStatus::Open,
            created_at: new_loan.created_at,
        };

        for barcode in &new_loan.items {
            let item = state
                .items
                .get_mut(barcode.as_str())
                .expect("validated above");
            *item = item.clone().into_on_loan(new_loan.created_at);

            state.loan_items.push(LoanItem {
                id: LoanItemId::new(),
                loan_id: loan.id,
                barcode: barcode.clone(),
                status: LoanItemStatus::OnLoan,
                returned_at: None,
            });
        }

        state.loans.push(loan.clone());
        Ok(loan)
    }

    async fn return_item(
        &self,
        barcode: &Barcode,
        returned_at: DateTime<Utc>,
    ) -> Result<ReturnedItem> {
        let mut state = self.db.lock();

        // オープンな貸出の下にある貸出中の明細を特定する
        let open_loan_ids: Vec<LoanId> = state
            .loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Open)
            .map(|loan| loan.id)
            .collect();

        let position = state.loan_items.iter().position(|item| {
            item.barcode == *barcode
                && item.status == LoanItemStatus::OnLoan
                && open_loan_ids.contains(&item.loan_id)
        });
        let Some(position) = position else {
            return Err(LoanStoreError::NotOnLoan);
        };

        let loan_item = {
            let entry = &mut state.loan_items[position];
            entry.status = LoanItemStatus::Returned;
            entry.returned_at = Some(returned_at);
            entry.clone()
        };

        if let Some(item) = state.items.get_mut(barcode.as_str()) {
            *item = item.clone().into_available(returned_at);
        }

        // 完了判定は書き込み時に再計算する（導出不変条件）
        let siblings: Vec<LoanItem> = state
            .loan_items
            .iter()
            .filter(|item| item.loan_id == loan_item.loan_id)
            .cloned()
            .collect();
        let completed = loan_completed(&siblings);

        let loan = state
            .loans
            .iter_mut()
            .find(|loan| loan.id == loan_item.loan_id)
            .expect("loan item always belongs to a loan");
        if completed {
            loan.status = LoanStatus::Completed;
        }
        let invoice_no = loan.invoice_no.clone();

        Ok(ReturnedItem {
            loan_item,
            invoice_no,
            loan_completed: completed,
        })
    }

    async fn get_by_invoice(
        &self,
        invoice_no: &InvoiceNo,
    ) -> Result<Option<(Loan, Vec<LoanItem>)>> {
        let state = self.db.lock();
        let Some(loan) = state
            .loans
            .iter()
            .find(|loan| loan.invoice_no == *invoice_no)
            .cloned()
        else {
            return Ok(None);
        };
        let items = state
            .loan_items
            .iter()
            .filter(|item| item.loan_id == loan.id)
            .cloned()
            .collect();
        Ok(Some((loan, items)))
    }

    async fn list_open(&self) -> Result<Vec<Loan>> {
        let state = self.db.lock();
        let mut loans: Vec<Loan> = state
            .loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Open)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loans)
    }
}

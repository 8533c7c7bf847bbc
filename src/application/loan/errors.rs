use thiserror::Error;

use crate::domain::errors::LoanItemsError;
use crate::domain::Barcode;
use crate::ports::borrower_store::BorrowerStoreError;
use crate::ports::loan_store::LoanStoreError;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 明細が1件もない
    #[error("Loan must contain at least one item")]
    EmptyItems,

    /// 同一バーコードが重複している
    #[error("Duplicate barcode in loan: {0}")]
    DuplicateItem(Barcode),

    /// 予約時に利用可能でない備品があった。全体がロールバックされる。
    /// 呼び出し側のローカルビューが古いことを意味する
    #[error("Item {0} is not available for loan")]
    ItemUnavailable(Barcode),

    /// 請求書番号のユニーク制約に衝突した（採番のバックストップ）
    #[error("Invoice number allocation conflict")]
    InvoiceAllocationConflict,

    /// BorrowerStoreのエラー
    #[error("Borrower store error")]
    BorrowerStoreError(#[source] BorrowerStoreError),

    /// LoanStoreのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] LoanStoreError),
}

impl From<LoanItemsError> for LoanApplicationError {
    fn from(err: LoanItemsError) -> Self {
        match err {
            LoanItemsError::Empty => LoanApplicationError::EmptyItems,
            LoanItemsError::Duplicate(barcode) => LoanApplicationError::DuplicateItem(barcode),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;

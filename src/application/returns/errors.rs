use thiserror::Error;

use crate::ports::loan_store::LoanStoreError;

/// 返却アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ReturnApplicationError {
    /// バーコードに対応する貸出中の明細が存在しない
    #[error("Item is not on loan")]
    NotOnLoan,

    /// LoanStoreのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] LoanStoreError),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ReturnApplicationError>;

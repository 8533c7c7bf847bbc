use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::inventory::InventoryApplicationError;
use crate::application::loan::LoanApplicationError;
use crate::application::returns::ReturnApplicationError;
use crate::application::scan::ScanApplicationError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを
/// 提供する。呼び出し側が「何も起きなかった」（404系）と「他の誰かが先に
/// 変更した」（409系：ローカルビューが古いのでリフレッシュして再試行）を
/// 区別できるようにステータスを割り当てる。
#[derive(Debug)]
pub enum ApiError {
    /// リクエストの形が不正（空バーコードなど）
    Validation(String),
    Scan(ScanApplicationError),
    Loan(LoanApplicationError),
    Return(ReturnApplicationError),
    Inventory(InventoryApplicationError),
}

impl From<ScanApplicationError> for ApiError {
    fn from(err: ScanApplicationError) -> Self {
        ApiError::Scan(err)
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<ReturnApplicationError> for ApiError {
    fn from(err: ReturnApplicationError) -> Self {
        ApiError::Return(err)
    }
}

impl From<InventoryApplicationError> for ApiError {
    fn from(err: InventoryApplicationError) -> Self {
        ApiError::Inventory(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 400 Bad Request - リクエストの形が不正
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),

            // 404 Not Found - 対象が存在しない（何も起きなかった）
            ApiError::Scan(ScanApplicationError::ItemNotFound) => (
                StatusCode::NOT_FOUND,
                "ITEM_NOT_FOUND",
                "Item not found".to_string(),
            ),
            ApiError::Return(ReturnApplicationError::NotOnLoan) => (
                StatusCode::NOT_FOUND,
                "NOT_ON_LOAN",
                "Item is not on loan".to_string(),
            ),

            // 409 Conflict - 他の呼び出し側が先に状態を変えた。
            // ローカルビューが古いため、リフレッシュしてから再試行すべき
            ApiError::Scan(ScanApplicationError::ConcurrentScanConflict) => (
                StatusCode::CONFLICT,
                "CONCURRENT_SCAN_CONFLICT",
                "Item was scanned concurrently by another caller".to_string(),
            ),
            ApiError::Loan(LoanApplicationError::ItemUnavailable(ref barcode)) => (
                StatusCode::CONFLICT,
                "ITEM_UNAVAILABLE",
                format!("Item {} is not available for loan", barcode),
            ),
            ApiError::Loan(LoanApplicationError::InvoiceAllocationConflict) => (
                StatusCode::CONFLICT,
                "INVOICE_ALLOCATION_CONFLICT",
                "Invoice number allocation conflict".to_string(),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            ApiError::Scan(ScanApplicationError::AlreadyScanned) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ALREADY_SCANNED",
                "Item already scanned".to_string(),
            ),
            ApiError::Loan(LoanApplicationError::EmptyItems) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_ITEMS",
                "Loan must contain at least one item".to_string(),
            ),
            ApiError::Loan(LoanApplicationError::DuplicateItem(ref barcode)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DUPLICATE_ITEM",
                format!("Duplicate barcode in loan: {}", barcode),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的な
            // メッセージのみを返す
            ApiError::Scan(ScanApplicationError::ItemStoreError(ref e)) => {
                tracing::error!("Item store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ITEM_STORE_ERROR",
                    "Item store error".to_string(),
                )
            }
            ApiError::Loan(LoanApplicationError::BorrowerStoreError(ref e)) => {
                tracing::error!("Borrower store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BORROWER_STORE_ERROR",
                    "Borrower store error".to_string(),
                )
            }
            ApiError::Loan(LoanApplicationError::LoanStoreError(ref e)) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Loan store error".to_string(),
                )
            }
            ApiError::Return(ReturnApplicationError::LoanStoreError(ref e)) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Loan store error".to_string(),
                )
            }
            ApiError::Inventory(InventoryApplicationError::ItemStoreError(ref e)) => {
                tracing::error!("Item store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ITEM_STORE_ERROR",
                    "Item store error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

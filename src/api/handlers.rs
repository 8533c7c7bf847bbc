use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::ServiceDependencies;
use crate::application::inventory::import_items as execute_import_items;
use crate::application::loan::create_loan as execute_create_loan;
use crate::application::returns::{
    return_batch as execute_return_batch, return_item as execute_return_item,
};
use crate::application::scan::{reset_scans as execute_reset_scans, scan_item as execute_scan_item};
use crate::domain::{BorrowerId, InvoiceNo};

use super::{
    error::ApiError,
    types::{
        ActivityEntryResponse, ActivityQuery, BorrowerResponse, BulkReturnRequest,
        BulkReturnResponse, CreateLoanRequest, ErrorResponse, ImportItemsRequest,
        ImportItemsResponse, ItemResponse, ListItemsQuery, LoanDetailResponse, LoanItemResponse,
        LoanResponse, ResetScansRequest, ResetScansResponse, ReturnRequest, ReturnResponse,
        ScanRequest,
    },
};

/// 一覧系エンドポイントのデフォルト件数
const DEFAULT_LIST_LIMIT: i64 = 50;

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /scans - 備品をスキャン済みにする（棚卸）
///
/// 強制されるビジネスルール:
/// - 備品が存在すること
/// - 既にScannedでないこと
///
/// 並行スキャンはストアの条件付き書き込みで高々1回に絞られ、
/// 敗れた側は409を受け取る。
pub async fn scan_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let item = execute_scan_item(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(ItemResponse::from(item))))
}

/// POST /scans/reset - スキャン印をリセットする
///
/// `barcode`を省略すると全件リセット。冪等な一括クリア。
pub async fn reset_scans(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetScansRequest>,
) -> Result<(StatusCode, Json<ResetScansResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let reset_count = execute_reset_scans(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(ResetScansResponse { reset_count })))
}

/// POST /items/import - 備品を一括取込する
///
/// 取込コラボレータのエントリポイント。バーコードでupsertし、
/// 既存行のステータスには触れない。
pub async fn import_items(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportItemsRequest>,
) -> Result<(StatusCode, Json<ImportItemsResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let imported_count = execute_import_items(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(ImportItemsResponse { imported_count })))
}

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 明細が1件以上あり、バーコードの重複がないこと
/// - すべての備品がAvailableであること（all-or-nothing）
///
/// 成功時は請求書番号・返却期限つきの貸出を返す（伝票印刷・署名表示用）。
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let loan = execute_create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// POST /returns - 備品を1件返却する
///
/// 明細のReturned化・備品のAvailable化・親貸出の完了判定が
/// 1トランザクションでコミットされる。
pub async fn return_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnRequest>,
) -> Result<(StatusCode, Json<ReturnResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let returned = execute_return_item(&state.service_deps, cmd).await?;

    let response = ReturnResponse {
        barcode: returned.loan_item.barcode.as_str().to_string(),
        invoice_no: returned.invoice_no.as_str().to_string(),
        returned_at: returned.loan_item.returned_at,
        loan_completed: returned.loan_completed,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// POST /returns/bulk - 備品を一括返却する（ベストエフォート）
///
/// 明細ごとの失敗は収集され、呼び出し全体は常に200で成功する。
/// 真の結果を知るには呼び出し側がサマリを検査すること。
pub async fn return_bulk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkReturnRequest>,
) -> Result<(StatusCode, Json<BulkReturnResponse>), ApiError> {
    let cmd = req
        .to_command(chrono::Utc::now())
        .map_err(ApiError::Validation)?;

    let summary = execute_return_batch(&state.service_deps, cmd).await;

    Ok((StatusCode::OK, Json(BulkReturnResponse::from(summary))))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /items - 利用可能な備品の一覧・検索
///
/// クエリパラメータ:
/// - search: 名前またはバーコードの部分一致（オプション）
/// - limit: 最大件数（デフォルト50）
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<ItemResponse>>, QueryError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let items = state
        .service_deps
        .item_store
        .list_available(query.search.as_deref(), limit)
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// GET /loans - オープンな貸出の一覧（新しい順）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, QueryError> {
    let loans = state
        .service_deps
        .loan_store
        .list_open()
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/:invoice_no - 貸出詳細を請求書番号で取得
///
/// 見つかった場合は明細つきの貸出情報を返し、見つからない場合は404を返す。
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(invoice_no): Path<String>,
) -> Result<Json<LoanDetailResponse>, QueryError> {
    let invoice_no = InvoiceNo::from_string(invoice_no);

    match state
        .service_deps
        .loan_store
        .get_by_invoice(&invoice_no)
        .await
    {
        Ok(Some((loan, items))) => Ok(Json(LoanDetailResponse {
            loan: LoanResponse::from(loan),
            items: items.into_iter().map(LoanItemResponse::from).collect(),
        })),
        Ok(None) => Err(QueryError::NotFound(format!(
            "Loan {} not found",
            invoice_no
        ))),
        Err(e) => Err(QueryError::InternalError(e.to_string())),
    }
}

/// GET /borrowers/:id - 借用者をキーで取得
pub async fn get_borrower(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BorrowerResponse>, QueryError> {
    let id = BorrowerId::new(id).map_err(|e| QueryError::BadRequest(e.to_string()))?;

    match state.service_deps.borrower_store.get(&id).await {
        Ok(Some(borrower)) => Ok(Json(BorrowerResponse::from(borrower))),
        Ok(None) => Err(QueryError::NotFound(format!("Borrower {} not found", id))),
        Err(e) => Err(QueryError::InternalError(e.to_string())),
    }
}

/// GET /activity - 監査ログの一覧（新しい順）
pub async fn recent_activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntryResponse>>, QueryError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let entries = state
        .service_deps
        .activity_log
        .recent(limit)
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(
        entries
            .into_iter()
            .map(ActivityEntryResponse::from)
            .collect(),
    ))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的な
                // メッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

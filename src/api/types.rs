use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::returns::BulkReturnSummary;
use crate::domain::commands::{
    CreateLoan, ImportItems, ResetScans, ReturnBatch, ReturnItem, ScanItem,
};
use crate::domain::{
    Barcode, Borrower, BorrowerId, DEFAULT_LOAN_PERIOD_DAYS, Item, Loan, LoanItem, NewItem,
};
use crate::ports::ActivityEntry;

fn default_loan_period_days() -> i64 {
    DEFAULT_LOAN_PERIOD_DAYS
}

// ============================================================================
// Requests
// ============================================================================

/// スキャンリクエスト（POST /scans）
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
    pub actor: String,
}

impl ScanRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<ScanItem, String> {
        let barcode = Barcode::new(self.barcode.clone()).map_err(|e| e.to_string())?;
        Ok(ScanItem {
            barcode,
            actor: self.actor.clone(),
            scanned_at: now,
        })
    }
}

/// スキャンリセットリクエスト（POST /scans/reset）
///
/// `barcode`を省略すると全件リセット。
#[derive(Debug, Deserialize)]
pub struct ResetScansRequest {
    pub barcode: Option<String>,
    pub actor: String,
}

impl ResetScansRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<ResetScans, String> {
        let barcode = match &self.barcode {
            Some(raw) => Some(Barcode::new(raw.clone()).map_err(|e| e.to_string())?),
            None => None,
        };
        Ok(ResetScans {
            barcode,
            actor: self.actor.clone(),
            reset_at: now,
        })
    }
}

/// 取込1行
///
/// 取込コラボレータ側でバーコード非空・価格数値を検証済みの行。
#[derive(Debug, Deserialize)]
pub struct ImportRowRequest {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: f64,
    pub category: Option<String>,
}

/// 取込リクエスト（POST /items/import）
#[derive(Debug, Deserialize)]
pub struct ImportItemsRequest {
    pub items: Vec<ImportRowRequest>,
    pub actor: String,
}

impl ImportItemsRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<ImportItems, String> {
        let rows = self
            .items
            .iter()
            .map(|row| {
                Ok(NewItem {
                    barcode: Barcode::new(row.barcode.clone()).map_err(|e| e.to_string())?,
                    name: row.name.clone(),
                    brand: row.brand.clone(),
                    color: row.color.clone(),
                    size: row.size.clone(),
                    price: row.price,
                    category: row.category.clone(),
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(ImportItems {
            rows,
            actor: self.actor.clone(),
            imported_at: now,
        })
    }
}

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub borrower_id: String,
    pub borrower_name: String,
    pub borrower_phone: Option<String>,
    pub borrower_email: Option<String>,
    pub inputter: String,
    pub program: String,
    pub reason: String,
    pub items: Vec<String>,
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: i64,
    pub signature: Option<String>,
}

impl CreateLoanRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<CreateLoan, String> {
        let borrower_id = BorrowerId::new(self.borrower_id.clone()).map_err(|e| e.to_string())?;
        let items = self
            .items
            .iter()
            .map(|raw| Barcode::new(raw.clone()).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, String>>()?;
        Ok(CreateLoan {
            borrower: Borrower {
                id: borrower_id,
                name: self.borrower_name.clone(),
                phone: self.borrower_phone.clone(),
                email: self.borrower_email.clone(),
            },
            inputter: self.inputter.clone(),
            program: self.program.clone(),
            reason: self.reason.clone(),
            items,
            loan_period_days: self.loan_period_days,
            signature: self.signature.clone(),
            loaned_at: now,
        })
    }
}

/// 返却リクエスト（POST /returns）
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub barcode: String,
    pub actor: String,
}

impl ReturnRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<ReturnItem, String> {
        let barcode = Barcode::new(self.barcode.clone()).map_err(|e| e.to_string())?;
        Ok(ReturnItem {
            barcode,
            actor: self.actor.clone(),
            returned_at: now,
        })
    }
}

/// 一括返却リクエスト（POST /returns/bulk）
#[derive(Debug, Deserialize)]
pub struct BulkReturnRequest {
    pub barcodes: Vec<String>,
    pub actor: String,
}

impl BulkReturnRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<ReturnBatch, String> {
        let barcodes = self
            .barcodes
            .iter()
            .map(|raw| Barcode::new(raw.clone()).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, String>>()?;
        Ok(ReturnBatch {
            barcodes,
            actor: self.actor.clone(),
            returned_at: now,
        })
    }
}

/// 備品一覧のクエリパラメータ（GET /items）
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// 名前またはバーコードの部分一致
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// 監査ログのクエリパラメータ（GET /activity）
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

// ============================================================================
// Responses
// ============================================================================

/// 備品レスポンス
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub status: String,
    pub scan_timestamp: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            barcode: item.barcode.as_str().to_string(),
            name: item.name,
            brand: item.brand,
            color: item.color,
            size: item.size,
            price: item.price,
            category: item.category,
            status: item.status.as_str().to_string(),
            scan_timestamp: item.scan_timestamp,
            updated_at: item.updated_at,
        }
    }
}

/// スキャンリセットレスポンス
#[derive(Debug, Serialize)]
pub struct ResetScansResponse {
    pub reset_count: u64,
}

/// 取込レスポンス
#[derive(Debug, Serialize)]
pub struct ImportItemsResponse {
    pub imported_count: u64,
}

/// 貸出明細レスポンス
#[derive(Debug, Serialize)]
pub struct LoanItemResponse {
    pub barcode: String,
    pub status: String,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<LoanItem> for LoanItemResponse {
    fn from(item: LoanItem) -> Self {
        Self {
            barcode: item.barcode.as_str().to_string(),
            status: item.status.as_str().to_string(),
            returned_at: item.returned_at,
        }
    }
}

/// 貸出レスポンス（ヘッダのみ。GET /loans と POST /loans）
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub invoice_no: String,
    pub borrower_id: String,
    pub borrower_name: String,
    pub inputter: String,
    pub program: String,
    pub reason: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            invoice_no: loan.invoice_no.as_str().to_string(),
            borrower_id: loan.borrower_id.as_str().to_string(),
            borrower_name: loan.borrower_name,
            inputter: loan.inputter,
            program: loan.program,
            reason: loan.reason,
            due_date: loan.due_date,
            status: loan.status.as_str().to_string(),
            created_at: loan.created_at,
        }
    }
}

/// 貸出詳細レスポンス（明細つき。GET /loans/:invoice_no）
#[derive(Debug, Serialize)]
pub struct LoanDetailResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub items: Vec<LoanItemResponse>,
}

/// 返却レスポンス
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub barcode: String,
    pub invoice_no: String,
    pub returned_at: Option<DateTime<Utc>>,
    pub loan_completed: bool,
}

/// 一括返却レスポンス
///
/// 呼び出し全体は常に200で成功し、明細ごとの真の結果はこのサマリを
/// 検査して判断する。
#[derive(Debug, Serialize)]
pub struct BulkReturnResponse {
    pub returned_count: usize,
    pub not_found: Vec<String>,
    pub errors: Vec<String>,
}

impl From<BulkReturnSummary> for BulkReturnResponse {
    fn from(summary: BulkReturnSummary) -> Self {
        Self {
            returned_count: summary.returned_count,
            not_found: summary.not_found,
            errors: summary.errors,
        }
    }
}

/// 借用者レスポンス
#[derive(Debug, Serialize)]
pub struct BorrowerResponse {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<Borrower> for BorrowerResponse {
    fn from(borrower: Borrower) -> Self {
        Self {
            id: borrower.id.as_str().to_string(),
            name: borrower.name,
            phone: borrower.phone,
            email: borrower.email,
        }
    }
}

/// 監査ログエントリレスポンス
#[derive(Debug, Serialize)]
pub struct ActivityEntryResponse {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityEntryResponse {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            actor: entry.actor,
            action: entry.action.as_str().to_string(),
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            detail: entry.detail,
            created_at: entry.created_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Barcode, BorrowerId, InvoiceNo, LoanId, LoanItemId, LoanItemStatus, LoanItemsError, LoanStatus,
};

/// 貸出期間のデフォルト（日数）
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 7;

/// 貸出トランザクションヘッダ
///
/// 明細（`LoanItem`）とともにアトミックに作成される。
/// `status`は導出値であり、全明細の返却完了時にのみCompletedになる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub invoice_no: InvoiceNo,
    pub borrower_id: BorrowerId,
    /// 貸出時点の借用者名スナップショット
    pub borrower_name: String,
    /// 入力担当者
    pub inputter: String,
    pub program: String,
    pub reason: String,
    pub due_date: DateTime<Utc>,
    /// 署名データ（base64テキスト）
    pub signature: Option<String>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

/// 貸出明細
///
/// 1つのLoanに属し、備品をバーコードで参照する。
/// 同一Loan内で同じバーコードの明細は作られない（ユニーク制約）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanItem {
    pub id: LoanItemId,
    pub loan_id: LoanId,
    pub barcode: Barcode,
    pub status: LoanItemStatus,
    pub returned_at: Option<DateTime<Utc>>,
}

/// 返却期限を計算する
pub fn due_date_for(loaned_at: DateTime<Utc>, loan_period_days: i64) -> DateTime<Utc> {
    loaned_at + Duration::days(loan_period_days)
}

/// 貸出完了の導出判定
///
/// 全明細がReturnedのときのみtrue。返却のたびに書き込み時へ再計算される。
pub fn loan_completed(items: &[LoanItem]) -> bool {
    items.iter().all(|item| item.status == LoanItemStatus::Returned)
}

/// 貸出対象バーコードリストの事前条件チェック
///
/// # エラー
/// - 空リスト → `LoanItemsError::Empty`
/// - 重複バーコード → `LoanItemsError::Duplicate`
pub fn validate_loan_items(items: &[Barcode]) -> Result<(), LoanItemsError> {
    if items.is_empty() {
        return Err(LoanItemsError::Empty);
    }
    let mut seen = HashSet::new();
    for barcode in items {
        if !seen.insert(barcode) {
            return Err(LoanItemsError::Duplicate(barcode.clone()));
        }
    }
    Ok(())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Barcode, Borrower, NewItem};

/// コマンド：備品をスキャンする（棚卸）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanItem {
    pub barcode: Barcode,
    pub actor: String,
    pub scanned_at: DateTime<Utc>,
}

/// コマンド：スキャン印をリセットする
///
/// `barcode`がNoneの場合は全件リセット。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetScans {
    pub barcode: Option<Barcode>,
    pub actor: String,
    pub reset_at: DateTime<Utc>,
}

/// コマンド：貸出を作成する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub borrower: Borrower,
    pub inputter: String,
    pub program: String,
    pub reason: String,
    pub items: Vec<Barcode>,
    pub loan_period_days: i64,
    pub signature: Option<String>,
    pub loaned_at: DateTime<Utc>,
}

/// コマンド：備品を1件返却する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub barcode: Barcode,
    pub actor: String,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：備品を一括返却する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBatch {
    pub barcodes: Vec<Barcode>,
    pub actor: String,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：備品を一括取込する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItems {
    pub rows: Vec<NewItem>,
    pub actor: String,
    pub imported_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Barcode, ItemStatus, ScanError};

/// 備品エンティティ
///
/// バーコードで一意に識別される物品。ステータス遷移は
/// スキャン・貸出・返却の各操作経由に限られる。
///
/// 不変条件：`status == Scanned ⇔ scan_timestamp != None`。
/// 本ファイルの遷移関数はすべてこの不変条件を保存する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub barcode: Barcode,
    pub name: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub status: ItemStatus,
    pub scan_timestamp: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// スキャン可能かの事前チェック
    ///
    /// 既にScannedの場合は`ScanError::AlreadyScanned`。
    /// これはfast-path判定であり、並行時の正しさはストアの
    /// 条件付き書き込みが保証する。
    pub fn ensure_scannable(&self) -> Result<(), ScanError> {
        if self.status == ItemStatus::Scanned {
            return Err(ScanError::AlreadyScanned);
        }
        Ok(())
    }

    /// スキャン済み状態へ遷移
    pub fn into_scanned(self, at: DateTime<Utc>) -> Item {
        Item {
            status: ItemStatus::Scanned,
            scan_timestamp: Some(at),
            updated_at: at,
            ..self
        }
    }

    /// 貸出中状態へ遷移
    pub fn into_on_loan(self, at: DateTime<Utc>) -> Item {
        Item {
            status: ItemStatus::OnLoan,
            scan_timestamp: None,
            updated_at: at,
            ..self
        }
    }

    /// 利用可能状態へ戻す（スキャン印もクリアする）
    pub fn into_available(self, at: DateTime<Utc>) -> Item {
        Item {
            status: ItemStatus::Available,
            scan_timestamp: None,
            updated_at: at,
            ..self
        }
    }
}

/// 一括取込の1行
///
/// 取込コラボレータがバーコード非空・価格数値を検証済みで渡してくる
/// （コアでは行の形を再検証しない）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub barcode: Barcode,
    pub name: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: f64,
    pub category: Option<String>,
}

impl NewItem {
    /// 新規行をAvailableな備品として実体化する
    pub fn into_item(self, at: DateTime<Utc>) -> Item {
        Item {
            barcode: self.barcode,
            name: self.name,
            brand: self.brand,
            color: self.color,
            size: self.size,
            price: self.price,
            category: self.category,
            status: ItemStatus::Available,
            scan_timestamp: None,
            updated_at: at,
        }
    }
}

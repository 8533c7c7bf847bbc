use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 識別子のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// 空文字（または空白のみ）
    Empty,
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierError::Empty => write!(f, "identifier must not be empty"),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// バーコード - 備品の一意キー
///
/// 不変条件：空でないこと（前後の空白は除去される）。
/// スキャン・貸出・返却のすべての操作はこのキーで備品を特定する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Barcode(String);

impl Barcode {
    /// バリデーション付きで作成
    ///
    /// # エラー
    /// 空文字（空白のみを含む）の場合は`IdentifierError::Empty`を返す
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 借用者ID - 国民ID相当の一意キー
///
/// 借用者は本キーでupsertされる。貸出は借用者名のスナップショットを
/// 保持するため、借用者の削除は過去の貸出に波及しない（ソフト参照）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowerId(String);

impl BorrowerId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BorrowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 貸出ID - 貸出トランザクションヘッダの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出明細ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanItemId(Uuid);

impl LoanItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// 請求書番号
///
/// 形式は`INV-YYYYMMDD-NNN`。日付ごとに単調増加し、一意性はストアの
/// ユニーク制約で保証される（連番の欠番は許容）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNo(String);

impl InvoiceNo {
    /// 日付と日内連番から請求書番号を組み立てる
    ///
    /// 連番は3桁ゼロ埋め。999を超えた場合は桁が自然に伸びる。
    pub fn allocate(day: chrono::NaiveDate, seq: u32) -> Self {
        Self(format!("INV-{}-{:03}", day.format("%Y%m%d"), seq))
    }

    /// 永続化済みの値から復元（ストアのアダプタ用）
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 備品のステータス
///
/// 遷移はスキャン・貸出・返却の操作経由に限る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    OnLoan,
    Scanned,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::OnLoan => "on_loan",
            ItemStatus::Scanned => "scanned",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "on_loan" => Ok(ItemStatus::OnLoan),
            "scanned" => Ok(ItemStatus::Scanned),
            other => Err(format!("unknown item status: {}", other)),
        }
    }
}

/// 貸出のステータス
///
/// `Completed`は導出値：全明細がReturnedになった時点でのみ成立する。
/// 独立して設定可能なフィールドではない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Open,
    Completed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "open",
            LoanStatus::Completed => "completed",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(LoanStatus::Open),
            "completed" => Ok(LoanStatus::Completed),
            other => Err(format!("unknown loan status: {}", other)),
        }
    }
}

/// 貸出明細のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanItemStatus {
    OnLoan,
    Returned,
}

impl LoanItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanItemStatus::OnLoan => "on_loan",
            LoanItemStatus::Returned => "returned",
        }
    }
}

impl FromStr for LoanItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_loan" => Ok(LoanItemStatus::OnLoan),
            "returned" => Ok(LoanItemStatus::Returned),
            other => Err(format!("unknown loan item status: {}", other)),
        }
    }
}

use serde::{Deserialize, Serialize};

use super::BorrowerId;

/// 借用者
///
/// 国民ID相当のキーでupsertされる。貸出側は貸出時点の氏名の
/// スナップショットを保持するため、ここの更新は過去の貸出に影響しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

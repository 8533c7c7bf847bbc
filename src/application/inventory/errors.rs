use thiserror::Error;

use crate::ports::item_store::ItemStoreError;

/// 在庫取込アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum InventoryApplicationError {
    /// ItemStoreのエラー
    #[error("Item store error")]
    ItemStoreError(#[source] ItemStoreError),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, InventoryApplicationError>;

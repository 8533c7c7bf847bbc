use thiserror::Error;

use crate::domain::errors::ScanError;
use crate::ports::item_store::ItemStoreError;

/// 棚卸スキャンアプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ScanApplicationError {
    /// バーコードに該当する備品が存在しない
    #[error("Item not found")]
    ItemNotFound,

    /// 既にスキャン済み（事前チェックによる冪等な拒否）
    #[error("Item already scanned")]
    AlreadyScanned,

    /// 条件付き書き込みの競争に敗れた（他の呼び出し側が先にスキャンした）。
    /// `AlreadyScanned`と異なり、呼び出し側のローカルビューが古いことを
    /// 意味する：リフレッシュしてから再試行すべき
    #[error("Item was scanned concurrently by another caller")]
    ConcurrentScanConflict,

    /// ItemStoreのエラー
    #[error("Item store error")]
    ItemStoreError(#[source] ItemStoreError),
}

impl From<ScanError> for ScanApplicationError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::AlreadyScanned => ScanApplicationError::AlreadyScanned,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ScanApplicationError>;

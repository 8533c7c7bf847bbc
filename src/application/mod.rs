pub mod inventory;
pub mod loan;
pub mod returns;
pub mod scan;

use std::sync::Arc;

use crate::ports::{ActivityLog, BorrowerStore, ItemStore, LoanStore, NewActivityEntry};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// このパターンにより：
/// - すべての依存が明示的
/// - データと振る舞いの分離
/// - テストが明確
#[derive(Clone)]
pub struct ServiceDependencies {
    pub item_store: Arc<dyn ItemStore>,
    pub loan_store: Arc<dyn LoanStore>,
    pub borrower_store: Arc<dyn BorrowerStore>,
    pub activity_log: Arc<dyn ActivityLog>,
}

/// 監査ログを追記するヘルパー関数
///
/// 各サービスの成功パスの最後で呼ばれる。この時点で業務の書き込みは
/// 既にコミット済みなので、追記の失敗でコミット済みの操作を失敗扱いに
/// してはならない。警告ログに落として処理を続行する。
pub(crate) async fn record_activity(log: &Arc<dyn ActivityLog>, entry: NewActivityEntry) {
    if let Err(err) = log.append(entry).await {
        tracing::warn!("activity log append failed after commit: {}", err);
    }
}

use serde::Serialize;

use crate::application::{ServiceDependencies, record_activity};
use crate::domain::commands::{ReturnBatch, ReturnItem};
use crate::ports::loan_store::LoanStoreError;
use crate::ports::{ActivityAction, NewActivityEntry, ReturnedItem};

use super::errors::{Result, ReturnApplicationError};

/// 一括返却の結果サマリ
///
/// 一括返却は常に成功し、明細ごとの結果はこの構造体で報告される。
/// 真の結果を知るには呼び出し側がサマリを検査しなければならない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReturnSummary {
    /// 返却に成功した件数
    pub returned_count: usize,
    /// 貸出中でなかったバーコード
    pub not_found: Vec<String>,
    /// トランザクションエラーになったバーコード（メッセージつき）
    pub errors: Vec<String>,
}

/// 備品を1件返却する（純粋な関数）
///
/// ビジネスルール：
/// - バーコードに対応する貸出中の明細が、オープンな貸出の下に存在すること
///
/// # 原子性保証
///
/// 明細のReturned化・備品のAvailable化・親貸出の完了判定の3つの書き込みは
/// ストア側の1トランザクションとしてコミットされる。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 返却コマンド
///
/// # 戻り値
/// 返却された明細（請求書番号・貸出完了フラグつき）
pub async fn return_item(deps: &ServiceDependencies, cmd: ReturnItem) -> Result<ReturnedItem> {
    // 1. ストアのアトミックな返却処理
    let returned = deps
        .loan_store
        .return_item(&cmd.barcode, cmd.returned_at)
        .await
        .map_err(|err| match err {
            LoanStoreError::NotOnLoan => ReturnApplicationError::NotOnLoan,
            other => ReturnApplicationError::LoanStoreError(other),
        })?;

    // 2. 監査ログ（トレーサビリティのため請求書番号を参照する）
    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: cmd.actor,
            action: ActivityAction::ItemReturned,
            entity_type: "loan".to_string(),
            entity_id: returned.invoice_no.as_str().to_string(),
            detail: format!("{} returned", cmd.barcode),
            created_at: cmd.returned_at,
        },
    )
    .await;

    Ok(returned)
}

/// 備品を一括返却する（ベストエフォート）
///
/// 各バーコードを`return_item`と同一の明細ロジックで独立に処理する。
/// 失敗は致命傷にせず収集する：貸出中でないバーコードは`not_found`へ、
/// トランザクションエラーは`errors`へ追記し、残りの処理を続行する
/// （貸出作成のall-or-nothingと対照的なバッチセマンティクス）。
///
/// 貸出完了判定はバッチ全体で1回ではなく、影響を受けた貸出ごとに走る。
/// 呼び出し全体としては常に成功し、監査ログにはバッチで1エントリを残す。
pub async fn return_batch(deps: &ServiceDependencies, cmd: ReturnBatch) -> BulkReturnSummary {
    let mut summary = BulkReturnSummary::default();

    for barcode in &cmd.barcodes {
        match deps.loan_store.return_item(barcode, cmd.returned_at).await {
            Ok(_) => summary.returned_count += 1,
            Err(LoanStoreError::NotOnLoan) => summary.not_found.push(barcode.to_string()),
            Err(err) => summary.errors.push(format!("{}: {}", barcode, err)),
        }
    }

    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: cmd.actor,
            action: ActivityAction::BatchReturned,
            entity_type: "loan".to_string(),
            entity_id: "batch".to_string(),
            detail: format!(
                "{} returned, {} not on loan, {} failed",
                summary.returned_count,
                summary.not_found.len(),
                summary.errors.len()
            ),
            created_at: cmd.returned_at,
        },
    )
    .await;

    summary
}

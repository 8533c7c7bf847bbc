use crate::application::{ServiceDependencies, record_activity};
use crate::domain::commands::{ResetScans, ScanItem};
use crate::domain::{Item, ItemStatus};
use crate::ports::{ActivityAction, NewActivityEntry, StatusPredicate};

use super::errors::{Result, ScanApplicationError};

/// 備品をスキャン済みに遷移させる（純粋な関数）
///
/// ビジネスルール：
/// - 備品が存在すること
/// - 既にScannedでないこと（貸出中の備品のスキャンは許可される）
///
/// # 並行性
///
/// 事前チェック（手順2）はfast-path最適化にすぎない。二重スキャンを
/// 実際に防ぐのは手順3の条件付き書き込みであり、同一バーコードへの
/// N個の並行スキャンのうちちょうど1つだけが行を更新できる。
/// 競争に敗れた呼び出しは`ConcurrentScanConflict`を受け取る。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - スキャンコマンド
///
/// # 戻り値
/// 更新後の備品
pub async fn scan_item(deps: &ServiceDependencies, cmd: ScanItem) -> Result<Item> {
    // 1. 備品の存在確認
    let item = deps
        .item_store
        .get(&cmd.barcode)
        .await
        .map_err(ScanApplicationError::ItemStoreError)?
        .ok_or(ScanApplicationError::ItemNotFound)?;

    // 2. 事前チェック（fast path）
    item.ensure_scannable()?;

    // 3. 条件付き書き込み：status != Scanned の行だけを更新する。
    //    読んでから書くのではなく、述語込みの1文として適用される
    let affected = deps
        .item_store
        .compare_and_swap_status(
            &cmd.barcode,
            StatusPredicate::IsNot(ItemStatus::Scanned),
            ItemStatus::Scanned,
            Some(cmd.scanned_at),
            cmd.scanned_at,
        )
        .await
        .map_err(ScanApplicationError::ItemStoreError)?;

    if affected == 0 {
        // 手順1〜2の後に他の呼び出し側が先にスキャンした
        return Err(ScanApplicationError::ConcurrentScanConflict);
    }

    // 4. 更新後の備品（手順3で適用した遷移をそのまま反映）
    let item = item.into_scanned(cmd.scanned_at);

    // 5. 監査ログ
    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: cmd.actor,
            action: ActivityAction::ItemScanned,
            entity_type: "item".to_string(),
            entity_id: item.barcode.as_str().to_string(),
            detail: format!("{} scanned", item.name),
            created_at: cmd.scanned_at,
        },
    )
    .await;

    Ok(item)
}

/// スキャン印をリセットする
///
/// Scanned → Available へ戻し、`scan_timestamp`をクリアする。
/// 冪等な一括クリアであり、スキャンのような競争ガードは持たない。
///
/// # 戻り値
/// リセットされた行数
pub async fn reset_scans(deps: &ServiceDependencies, cmd: ResetScans) -> Result<u64> {
    let affected = deps
        .item_store
        .reset_scanned(cmd.barcode.as_ref(), cmd.reset_at)
        .await
        .map_err(ScanApplicationError::ItemStoreError)?;

    let entity_id = cmd
        .barcode
        .as_ref()
        .map(|b| b.as_str().to_string())
        .unwrap_or_else(|| "all".to_string());

    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: cmd.actor,
            action: ActivityAction::ScanReset,
            entity_type: "item".to_string(),
            entity_id,
            detail: format!("{} scan mark(s) cleared", affected),
            created_at: cmd.reset_at,
        },
    )
    .await;

    Ok(affected)
}

use crate::application::{ServiceDependencies, record_activity};
use crate::domain::commands::ImportItems;
use crate::ports::{ActivityAction, NewActivityEntry};

use super::errors::{InventoryApplicationError, Result};

/// 備品を一括取込する
///
/// 取込コラボレータのエントリポイント。行はバーコード非空・価格数値を
/// 検証済みで渡される前提であり、ここでは形の再検証を行わない。
/// バーコードでupsertし、競合するフィールドはlast-write-wins。
/// 既存行のステータスとスキャン印には触れない。
///
/// # 戻り値
/// 書き込まれた行数
pub async fn import_items(deps: &ServiceDependencies, cmd: ImportItems) -> Result<u64> {
    let count = deps
        .item_store
        .bulk_upsert(cmd.rows, cmd.imported_at)
        .await
        .map_err(InventoryApplicationError::ItemStoreError)?;

    record_activity(
        &deps.activity_log,
        NewActivityEntry {
            actor: cmd.actor,
            action: ActivityAction::ItemsImported,
            entity_type: "item".to_string(),
            entity_id: "import".to_string(),
            detail: format!("{} row(s) upserted", count),
            created_at: cmd.imported_at,
        },
    )
    .await;

    Ok(count)
}

use crate::domain::{Barcode, Item, ItemStatus, NewItem};
use crate::ports::item_store::{ItemStore as ItemStoreTrait, Result, StatusPredicate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::db::Db;

/// ItemStoreのモック実装
///
/// 共有の`Db`ハンドル上で動く。条件付き書き込みはロック保持中に
/// 述語評価と更新を行うため、本物のストアと同じく1つの原子的操作になる。
pub struct ItemStore {
    db: Db,
}

impl ItemStore {
    pub fn new(db: &Db) -> Self {
        Self { db: db.clone() }
    }

    /// テスト用に備品を直接登録
    pub fn add_item(&self, item: Item) {
        let mut state = self.db.lock();
        state.items.insert(item.barcode.as_str().to_string(), item);
    }
}

#[async_trait]
impl ItemStoreTrait for ItemStore {
    async fn get(&self, barcode: &Barcode) -> Result<Option<Item>> {
        let state = self.db.lock();
        Ok(state.items.get(barcode.as_str()).cloned())
    }

    async fn compare_and_swap_status(
        &self,
        barcode: &Barcode,
        predicate: StatusPredicate,
        next: ItemStatus,
        scan_timestamp: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut state = self.db.lock();
        match state.items.get_mut(barcode.as_str()) {
            Some(item) if predicate.matches(item.status) => {
                item.status = next;
                item.scan_timestamp = scan_timestamp;
                item.updated_at = updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn list_available(&self, search: Option<&str>, limit: i64) -> Result<Vec<Item>> {
        let state = self.db.lock();
        let needle = search.map(|s| s.to_lowercase());
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|item| item.status == ItemStatus::Available)
            .filter(|item| match &needle {
                Some(needle) => {
                    item.name.to_lowercase().contains(needle)
                        || item.barcode.as_str().to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn bulk_upsert(&self, rows: Vec<NewItem>, updated_at: DateTime<Utc>) -> Result<u64> {
        let mut state = self.db.lock();
        let count = rows.len() as u64;
        for row in rows {
            match state.items.get_mut(row.barcode.as_str()) {
                // 既存行：記述フィールドのみlast-write-wins。ステータスと
                // スキャン印には触れない
                Some(existing) => {
                    existing.name = row.name;
                    existing.brand = row.brand;
                    existing.color = row.color;
                    existing.size = row.size;
                    existing.price = row.price;
                    existing.category = row.category;
                    existing.updated_at = updated_at;
                }
                None => {
                    let item = row.into_item(updated_at);
                    state.items.insert(item.barcode.as_str().to_string(), item);
                }
            }
        }
        Ok(count)
    }

    async fn reset_scanned(
        &self,
        barcode: Option<&Barcode>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut state = self.db.lock();
        let mut affected = 0;
        for item in state.items.values_mut() {
            if item.status != ItemStatus::Scanned {
                continue;
            }
            if let Some(barcode) = barcode {
                if item.barcode != *barcode {
                    continue;
                }
            }
            item.status = ItemStatus::Available;
            item.scan_timestamp = None;
            item.updated_at = updated_at;
            affected += 1;
        }
        Ok(affected)
    }
}

use crate::domain::{Barcode, Item, ItemStatus, NewItem};
use crate::ports::item_store::{
    ItemStore as ItemStoreTrait, ItemStoreError, Result, StatusPredicate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// PostgreSQLの行データをItemに変換する
///
/// ステータス文字列のパースでエラーハンドリングを行う。
fn map_row_to_item(row: &PgRow) -> Result<Item> {
    let status_str: &str = row.get("status");
    let status = ItemStatus::from_str(status_str).map_err(|e| {
        ItemStoreError::Store(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })?;

    let barcode_str: &str = row.get("barcode");
    let barcode = Barcode::new(barcode_str).map_err(|e| ItemStoreError::Store(Box::new(e)))?;

    Ok(Item {
        barcode,
        name: row.get("name"),
        brand: row.get("brand"),
        color: row.get("color"),
        size: row.get("size"),
        price: row.get("price"),
        category: row.get("category"),
        status,
        scan_timestamp: row.get("scan_timestamp"),
        updated_at: row.get("updated_at"),
    })
}

fn store_err(err: sqlx::Error) -> ItemStoreError {
    ItemStoreError::Store(Box::new(err))
}

/// Shared conditional-write primitive.
///
/// One UPDATE statement whose WHERE clause carries the status predicate, so
/// the read-check and the write are a single atomic statement in the store.
/// Generic over the executor: the pool for scans, a transaction for the loan
/// reservation.
pub(super) async fn conditional_status_update<'e, E>(
    executor: E,
    barcode: &Barcode,
    predicate: StatusPredicate,
    next: ItemStatus,
    scan_timestamp: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
) -> sqlx::Result<u64>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let (operator, guard) = match predicate {
        StatusPredicate::Is(status) => ("=", status),
        StatusPredicate::IsNot(status) => ("!=", status),
    };

    let sql = format!(
        r#"
        UPDATE items
        SET status = $1, scan_timestamp = $2, updated_at = $3
        WHERE barcode = $4 AND status {} $5
        "#,
        operator
    );

    let result = sqlx::query(&sql)
        .bind(next.as_str())
        .bind(scan_timestamp)
        .bind(updated_at)
        .bind(barcode.as_str())
        .bind(guard.as_str())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// PostgreSQL implementation of ItemStore.
pub struct ItemStore {
    pool: PgPool,
}

impl ItemStore {
    /// Create a new ItemStore with a PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStoreTrait for ItemStore {
    async fn get(&self, barcode: &Barcode) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT barcode, name, brand, color, size, price, category,
                   status, scan_timestamp, updated_at
            FROM items
            WHERE barcode = $1
            "#,
        )
        .bind(barcode.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(map_row_to_item).transpose()
    }

    async fn compare_and_swap_status(
        &self,
        barcode: &Barcode,
        predicate: StatusPredicate,
        next: ItemStatus,
        scan_timestamp: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        conditional_status_update(
            &self.pool,
            barcode,
            predicate,
            next,
            scan_timestamp,
            updated_at,
        )
        .await
        .map_err(store_err)
    }

    async fn list_available(&self, search: Option<&str>, limit: i64) -> Result<Vec<Item>> {
        let rows = match search {
            Some(search) => {
                let pattern = format!("%{}%", search);
                sqlx::query(
                    r#"
                    SELECT barcode, name, brand, color, size, price, category,
                           status, scan_timestamp, updated_at
                    FROM items
                    WHERE status = 'available'
                      AND (name ILIKE $1 OR barcode ILIKE $1)
                    ORDER BY name ASC
                    LIMIT $2
                    "#,
                )
                .bind(pattern)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT barcode, name, brand, color, size, price, category,
                           status, scan_timestamp, updated_at
                    FROM items
                    WHERE status = 'available'
                    ORDER BY name ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(store_err)?;

        rows.iter().map(map_row_to_item).collect()
    }

    /// バーコードでupsertする取込パス
    ///
    /// INSERT ... ON CONFLICT UPDATE で重複バーコードを作らないことを保証。
    /// 記述フィールドはlast-write-wins、既存行のステータスとスキャン印は
    /// 更新対象に含めない。全行を1トランザクションで書き込む。
    async fn bulk_upsert(&self, rows: Vec<NewItem>, updated_at: DateTime<Utc>) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let count = rows.len() as u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO items (
                    barcode, name, brand, color, size, price, category,
                    status, scan_timestamp, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'available', NULL, $8)
                ON CONFLICT (barcode)
                DO UPDATE SET
                    name = EXCLUDED.name,
                    brand = EXCLUDED.brand,
                    color = EXCLUDED.color,
                    size = EXCLUDED.size,
                    price = EXCLUDED.price,
                    category = EXCLUDED.category,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(row.barcode.as_str())
            .bind(&row.name)
            .bind(&row.brand)
            .bind(&row.color)
            .bind(&row.size)
            .bind(row.price)
            .bind(&row.category)
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;
        Ok(count)
    }

    async fn reset_scanned(
        &self,
        barcode: Option<&Barcode>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = match barcode {
            Some(barcode) => {
                sqlx::query(
                    r#"
                    UPDATE items
                    SET status = 'available', scan_timestamp = NULL, updated_at = $1
                    WHERE status = 'scanned' AND barcode = $2
                    "#,
                )
                .bind(updated_at)
                .bind(barcode.as_str())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE items
                    SET status = 'available', scan_timestamp = NULL, updated_at = $1
                    WHERE status = 'scanned'
                    "#,
                )
                .bind(updated_at)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(store_err)?;

        Ok(result.rows_affected())
    }
}

use crate::domain::{Borrower, BorrowerId};
use crate::ports::borrower_store::{BorrowerStore as BorrowerStoreTrait, BorrowerStoreError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

fn store_err(err: sqlx::Error) -> BorrowerStoreError {
    BorrowerStoreError::Store(Box::new(err))
}

/// PostgreSQL implementation of BorrowerStore.
pub struct BorrowerStore {
    pool: PgPool,
}

impl BorrowerStore {
    /// Create a new BorrowerStore with a PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowerStoreTrait for BorrowerStore {
    /// キーでupsertする（INSERT ... ON CONFLICT UPDATE、last-write-wins）
    async fn upsert(&self, borrower: Borrower) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO borrowers (id, name, phone, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email
            "#,
        )
        .bind(borrower.id.as_str())
        .bind(&borrower.name)
        .bind(&borrower.phone)
        .bind(&borrower.email)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn get(&self, id: &BorrowerId) -> Result<Option<Borrower>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, email
            FROM borrowers
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id_str: &str = row.get("id");
        let id = BorrowerId::new(id_str).map_err(|e| BorrowerStoreError::Store(Box::new(e)))?;

        Ok(Some(Borrower {
            id,
            name: row.get("name"),
            phone: row.get("phone"),
            email: row.get("email"),
        }))
    }
}

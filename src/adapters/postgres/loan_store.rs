use crate::domain::{
    Barcode, BorrowerId, InvoiceNo, ItemStatus, Loan, LoanId, LoanItem, LoanItemId,
    LoanItemStatus, LoanStatus,
};
use crate::ports::item_store::StatusPredicate;
use crate::ports::loan_store::{
    LoanStore as LoanStoreTrait, LoanStoreError, NewLoan, Result, ReturnedItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

use super::item_store::conditional_status_update;

fn store_err(err: sqlx::Error) -> LoanStoreError {
    LoanStoreError::Store(Box::new(err))
}

fn invalid_data(message: String) -> LoanStoreError {
    LoanStoreError::Store(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(invalid_data)?;

    let borrower_id_str: &str = row.get("borrower_id");
    let borrower_id = BorrowerId::new(borrower_id_str).map_err(|e| invalid_data(e.to_string()))?;

    let invoice_no_str: &str = row.get("invoice_no");

    Ok(Loan {
        id: LoanId::from_uuid(row.get("id")),
        invoice_no: InvoiceNo::from_string(invoice_no_str),
        borrower_id,
        borrower_name: row.get("borrower_name"),
        inputter: row.get("inputter"),
        program: row.get("program"),
        reason: row.get("reason"),
        due_date: row.get("due_date"),
        signature: row.get("signature"),
        status,
        created_at: row.get("created_at"),
    })
}

/// PostgreSQLの行データをLoanItemに変換する
fn map_row_to_loan_item(row: &PgRow) -> Result<LoanItem> {
    let status_str: &str = row.get("status");
    let status = LoanItemStatus::from_str(status_str).map_err(invalid_data)?;

    let barcode_str: &str = row.get("barcode");
    let barcode = Barcode::new(barcode_str).map_err(|e| invalid_data(e.to_string()))?;

    Ok(LoanItem {
        id: LoanItemId::from_uuid(row.get("id")),
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        barcode,
        status,
        returned_at: row.get("returned_at"),
    })
}

/// PostgreSQL implementation of LoanStore.
///
/// Each port method is one transaction: begin, write everything, commit.
/// A business-rule failure inside the scope returns before commit, so the
/// transaction rolls back as a unit.
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// Create a new LoanStore with a PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    /// 貸出をアトミックに作成する
    ///
    /// 採番・ヘッダinsert・明細insert・備品フリップを1トランザクションで
    /// 行う。採番は当日カウンタ行のアトミックなインクリメント：行ロックが
    /// 並行する採番を直列化するため、count-then-insertの競合は起きない。
    /// `loans.invoice_no`のユニーク制約はバックストップとして残る。
    async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // 日内連番の採番（UPSERT ... RETURNING が行ロックで直列化する）
        let day = new_loan.created_at.date_naive();
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_counters (day, counter)
            VALUES ($1, 1)
            ON CONFLICT (day)
            DO UPDATE SET counter = invoice_counters.counter + 1
            RETURNING counter
            "#,
        )
        .bind(day)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        let invoice_no = InvoiceNo::allocate(day, seq as u32);
        let loan_id = LoanId::new();

        // Loanヘッダ insert
        let inserted = sqlx::query(
            r#"
            INSERT INTO loans (
                id, invoice_no, borrower_id, borrower_name, inputter,
                program, reason, due_date, signature, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(loan_id.value())
        .bind(invoice_no.as_str())
        .bind(new_loan.borrower_id.as_str())
        .bind(&new_loan.borrower_name)
        .bind(&new_loan.inputter)
        .bind(&new_loan.program)
        .bind(&new_loan.reason)
        .bind(new_loan.due_date)
        .bind(&new_loan.signature)
        .bind(LoanStatus::Open.as_str())
        .bind(new_loan.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            return Err(match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    LoanStoreError::InvoiceConflict
                }
                other => store_err(other),
            });
        }

        // 明細ごとに条件付きフリップ（Available → OnLoan）と明細insert。
        // 1件でも条件を満たさなければここでreturnし、txのdropが
        // 採番・ヘッダ・先行明細のすべてをロールバックする
        for barcode in &new_loan.items {
            let affected = conditional_status_update(
                &mut *tx,
                barcode,
                StatusPredicate::Is(ItemStatus::Available),
                ItemStatus::OnLoan,
                None,
                new_loan.created_at,
            )
            .await
            .map_err(store_err)?;

            if affected == 0 {
                return Err(LoanStoreError::ItemUnavailable(barcode.clone()));
            }

            sqlx::query(
                r#"
                INSERT INTO loan_items (id, loan_id, barcode, status)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(LoanItemId::new().value())
            .bind(loan_id.value())
            .bind(barcode.as_str())
            .bind(LoanItemStatus::OnLoan.as_str())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;

        Ok(Loan {
            id: loan_id,
            invoice_no,
            borrower_id: new_loan.borrower_id,
            borrower_name: new_loan.borrower_name,
            inputter: new_loan.inputter,
            program: new_loan.program,
            reason: new_loan.reason,
            due_date: new_loan.due_date,
            signature: new_loan.signature,
            status: LoanStatus::Open,
            created_at: new_loan.created_at,
        })
    }

    /// 備品を1件返却する
    ///
    /// 貸出中の明細を行ロック付きで特定し、明細のReturned化・備品の
    /// Available化・親貸出の完了再計算を1トランザクションでコミットする。
    async fn return_item(
        &self,
        barcode: &Barcode,
        returned_at: DateTime<Utc>,
    ) -> Result<ReturnedItem> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // オープンな貸出の下にある貸出中の明細を特定する。FOR UPDATEで
        // 行をロックするため、同じバーコードへの並行返却は直列化され、
        // 後続はロック解放後に述語を満たさず NotOnLoan になる
        let row = sqlx::query(
            r#"
            SELECT li.id AS loan_item_id, li.loan_id, l.invoice_no
            FROM loan_items li
            JOIN loans l ON l.id = li.loan_id
            WHERE li.barcode = $1 AND li.status = 'on_loan' AND l.status = 'open'
            FOR UPDATE
            "#,
        )
        .bind(barcode.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Err(LoanStoreError::NotOnLoan);
        };
        let loan_item_id: Uuid = row.get("loan_item_id");
        let loan_id: Uuid = row.get("loan_id");
        let invoice_no_str: String = row.get("invoice_no");

        sqlx::query(
            r#"
            UPDATE loan_items
            SET status = 'returned', returned_at = $2
            WHERE id = $1
            "#,
        )
        .bind(loan_item_id)
        .bind(returned_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        // 備品をAvailableへ戻す。スキャン印も同時にクリアし、
        // Scanned ⇔ scan_timestamp の不変条件を保つ
        sqlx::query(
            r#"
            UPDATE items
            SET status = 'available', scan_timestamp = NULL, updated_at = $2
            WHERE barcode = $1
            "#,
        )
        .bind(barcode.as_str())
        .bind(returned_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        // 完了判定は書き込み時に再計算する（導出不変条件）
        let remaining: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loan_items
            WHERE loan_id = $1 AND status = 'on_loan'
            "#,
        )
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        let completed = remaining == 0;
        if completed {
            sqlx::query(r#"UPDATE loans SET status = 'completed' WHERE id = $1"#)
                .bind(loan_id)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;

        Ok(ReturnedItem {
            loan_item: LoanItem {
                id: LoanItemId::from_uuid(loan_item_id),
                loan_id: LoanId::from_uuid(loan_id),
                barcode: barcode.clone(),
                status: LoanItemStatus::Returned,
                returned_at: Some(returned_at),
            },
            invoice_no: InvoiceNo::from_string(invoice_no_str),
            loan_completed: completed,
        })
    }

    async fn get_by_invoice(
        &self,
        invoice_no: &InvoiceNo,
    ) -> Result<Option<(Loan, Vec<LoanItem>)>> {
        let row = sqlx::query(
            r#"
            SELECT id, invoice_no, borrower_id, borrower_name, inputter,
                   program, reason, due_date, signature, status, created_at
            FROM loans
            WHERE invoice_no = $1
            "#,
        )
        .bind(invoice_no.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let loan = map_row_to_loan(&row)?;

        let item_rows = sqlx::query(
            r#"
            SELECT id, loan_id, barcode, status, returned_at
            FROM loan_items
            WHERE loan_id = $1
            ORDER BY barcode ASC
            "#,
        )
        .bind(loan.id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let items = item_rows
            .iter()
            .map(map_row_to_loan_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some((loan, items)))
    }

    async fn list_open(&self) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_no, borrower_id, borrower_name, inputter,
                   program, reason, due_date, signature, status, created_at
            FROM loans
            WHERE status = 'open'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(map_row_to_loan).collect()
    }
}

use crate::ports::activity_log::{
    ActivityAction, ActivityEntry, ActivityLog as ActivityLogTrait, ActivityLogError,
    NewActivityEntry, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

fn store_err(err: sqlx::Error) -> ActivityLogError {
    ActivityLogError::Store(Box::new(err))
}

fn map_row_to_entry(row: &PgRow) -> Result<ActivityEntry> {
    let action_str: &str = row.get("action");
    let action = ActivityAction::from_str(action_str).map_err(|e| {
        ActivityLogError::Store(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })?;

    Ok(ActivityEntry {
        id: row.get("id"),
        actor: row.get("actor"),
        action,
        entity_type: row.get("entity_type"),
        entity_id: row.get("entity_id"),
        detail: row.get("detail"),
        created_at: row.get("created_at"),
    })
}

/// PostgreSQL implementation of ActivityLog.
///
/// Entries are stored in an append-only table and never updated or deleted
/// by normal operation.
pub struct ActivityLog {
    pool: PgPool,
}

impl ActivityLog {
    /// Create a new ActivityLog with a PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogTrait for ActivityLog {
    async fn append(&self, entry: NewActivityEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (actor, action, entity_type, entity_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.actor)
        .bind(entry.action.as_str())
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, actor, action, entity_type, entity_id, detail, created_at
            FROM activity_logs
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(map_row_to_entry).collect()
    }
}

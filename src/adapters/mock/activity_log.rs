use crate::ports::activity_log::{
    ActivityEntry, ActivityLog as ActivityLogTrait, NewActivityEntry, Result,
};
use async_trait::async_trait;

use super::db::Db;

/// Mock implementation of ActivityLog.
///
/// Append-only vector with a monotonically increasing id.
pub struct ActivityLog {
    db: Db,
}

impl ActivityLog {
    pub fn new(db: &Db) -> Self {
        Self { db: db.clone() }
    }

    /// テスト用：記録済みエントリ全件（追記順）
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.db.lock().activity_entries.clone()
    }
}

#[async_trait]
impl ActivityLogTrait for ActivityLog {
    async fn append(&self, entry: NewActivityEntry) -> Result<()> {
        let mut state = self.db.lock();
        state.next_activity_id += 1;
        let id = state.next_activity_id;
        state.activity_entries.push(ActivityEntry {
            id,
            actor: entry.actor,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            detail: entry.detail,
            created_at: entry.created_at,
        });
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>> {
        let state = self.db.lock();
        Ok(state
            .activity_entries
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

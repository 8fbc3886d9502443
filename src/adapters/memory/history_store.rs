use crate::{
    domain::{HistoryEntry, TransactionKind, UserId},
    ports::history::{Error, HistoryStore},
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl MemoryHistoryStore {
    /// Number of entries across all users
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.entries.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        kind: TransactionKind,
        recorded_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, Error> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            amount,
            kind,
            recorded_at,
        };
        self.entries.lock()?.push(entry.clone());

        Ok(entry)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, Error> {
        let entries = self
            .entries
            .lock()?
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();

        Ok(entries)
    }
}

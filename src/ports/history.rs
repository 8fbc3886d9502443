use chrono::{DateTime, Utc};

use crate::domain::{HistoryEntry, TransactionKind, UserId};

/// Append-only ledger of balance changes
#[mockall::automock]
#[async_trait::async_trait]
pub trait HistoryStore {
    /// Record one balance change and return it with its assigned identifier
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        kind: TransactionKind,
        recorded_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, Error>;

    /// All entries of a user, in insertion order
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter, such as connectivity,
    /// configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}

use crate::domain::{BalanceRecord, UserId};

/// Storage for the current balance of each user
///
/// Each call is expected to be atomic on its own. Callers that need a
/// read-modify-write sequence must serialize it themselves.
#[mockall::automock]
#[async_trait::async_trait]
pub trait BalanceStore {
    /// Fetch the balance of a user
    ///
    /// A user that was never written is not an error: the store yields a zero
    /// balance record instead.
    async fn get(&self, user_id: UserId) -> Result<BalanceRecord, Error>;

    /// Persist a new balance and return the canonical record
    ///
    /// The returned `updated_at` is assigned by the store.
    async fn put(&self, user_id: UserId, balance: u64) -> Result<BalanceRecord, Error>;
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

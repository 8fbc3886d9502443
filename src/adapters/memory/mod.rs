//! In-process store adapters
//!
//! Both stores keep their state behind an `Arc<Mutex<..>>` so clones share the same data.

use std::sync::PoisonError;

use crate::ports::{balance, history};

mod balance_store;
mod history_store;

pub use balance_store::MemoryBalanceStore;
pub use history_store::MemoryHistoryStore;

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for balance::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for history::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

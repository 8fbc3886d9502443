//! Point operations
//!
//! [`PointService`] exposes one async method per operation. Each operation also has a request
//! type in its own module, served through [`tower::Service`] so the service can be wrapped in
//! middleware by whatever transport sits in front of it.
//!
//! Mutations (`credit`, `debit`) run under the user's lock from [`KeyLockManager`]: read the
//! balance, validate, write the balance, then append the history entry. Reads bypass the lock.
//! The balance write and the history append are two independent store calls. If the append
//! fails after the balance write went through, the error is returned and the two stores
//! disagree until repaired out of band.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::{BalanceRecord, TransactionKind, UserId},
    lock::KeyLockManager,
    ports::history::HistoryStore,
};

pub mod balance;
pub mod credit;
pub mod debit;
pub mod history;

pub struct PointService<B, H> {
    balances: Arc<B>,
    history: Arc<H>,
    locks: Arc<KeyLockManager<UserId>>,
    config: Config,
}

impl<B, H> PointService<B, H> {
    pub fn new(
        balances: Arc<B>,
        history: Arc<H>,
        locks: Arc<KeyLockManager<UserId>>,
        config: Config,
    ) -> Self {
        Self {
            balances,
            history,
            locks,
            config,
        }
    }

    /// Service with its own lock manager and the default policy
    pub fn from_stores(balances: B, history: H) -> Self {
        Self::new(
            Arc::new(balances),
            Arc::new(history),
            Arc::new(KeyLockManager::new()),
            Config::default(),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<B, H> Clone for PointService<B, H> {
    fn clone(&self) -> Self {
        Self {
            balances: self.balances.clone(),
            history: self.history.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B, H> PointService<B, H>
where
    H: HistoryStore,
{
    /// Append the ledger line for a balance write that already happened
    ///
    /// Must be called while holding the user's lock.
    async fn record(
        &self,
        amount: u64,
        kind: TransactionKind,
        updated: &BalanceRecord,
    ) -> Result<(), Error> {
        if let Err(err) = self
            .history
            .append(updated.user_id, amount, kind, updated.updated_at)
            .await
        {
            tracing::warn!(
                user_id = %updated.user_id,
                %kind,
                amount,
                balance = updated.balance,
                "balance written but history append failed: {err}"
            );
            return Err(err.into());
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("balance port error: {0:?}")]
    Balance(#[from] crate::ports::balance::Error),
    #[error("history port error: {0:?}")]
    History(#[from] crate::ports::history::Error),

    /// Debit larger than the current balance
    ///
    /// Nothing was written when this is returned.
    #[error("insufficient balance for user {user_id}: {balance} available, {amount} requested")]
    InsufficientBalance {
        user_id: UserId,
        balance: u64,
        amount: u64,
    },

    /// Amounts must be strictly positive
    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: u64 },

    /// The resulting balance does not fit in a `u64`
    #[error("crediting {amount} to user {user_id} overflows balance {balance}")]
    BalanceOverflow {
        user_id: UserId,
        balance: u64,
        amount: u64,
    },

    /// The resulting balance is above [`Config::max_balance`]
    #[error("crediting {amount} to user {user_id} exceeds the maximum balance {max_balance}")]
    MaxBalanceExceeded {
        user_id: UserId,
        amount: u64,
        max_balance: u64,
    },
}

fn validate_amount(amount: u64) -> Result<(), Error> {
    if amount == 0 {
        return Err(Error::InvalidAmount { amount });
    }

    Ok(())
}

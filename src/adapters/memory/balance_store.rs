use crate::{
    domain::{BalanceRecord, UserId},
    ports::balance::{BalanceStore, Error},
};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Clone, Debug, Default)]
pub struct MemoryBalanceStore {
    balances: Arc<Mutex<HashMap<UserId, BalanceRecord>>>,
}

#[async_trait::async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn get(&self, user_id: UserId) -> Result<BalanceRecord, Error> {
        let record = self
            .balances
            .lock()?
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| BalanceRecord::empty(user_id, Utc::now()));

        Ok(record)
    }

    async fn put(&self, user_id: UserId, balance: u64) -> Result<BalanceRecord, Error> {
        let record = BalanceRecord {
            user_id,
            balance,
            updated_at: Utc::now(),
        };
        self.balances.lock()?.insert(user_id, record.clone());

        Ok(record)
    }
}

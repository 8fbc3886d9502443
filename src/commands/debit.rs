use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{BalanceRecord, TransactionKind, UserId},
    ports::{balance::BalanceStore, history::HistoryStore},
};
use tower::Service;

use super::{validate_amount, Error, PointService};

pub struct DebitRequest {
    pub user_id: UserId,
    pub amount: u64,
}

impl<B, H> PointService<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    /// Spend `amount` points from a user's balance
    ///
    /// Fails with [`Error::InsufficientBalance`] without writing anything if the balance is
    /// lower than `amount`.
    pub async fn debit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, Error> {
        validate_amount(amount)?;

        let _guard = self.locks.lock(user_id).await;
        let current = self.balances.get(user_id).await?;

        let Some(balance) = current.balance.checked_sub(amount) else {
            tracing::warn!(
                %user_id,
                amount,
                balance = current.balance,
                "rejected debit: insufficient balance"
            );
            return Err(Error::InsufficientBalance {
                user_id,
                balance: current.balance,
                amount,
            });
        };

        let updated = self.balances.put(user_id, balance).await?;
        self.record(amount, TransactionKind::Debit, &updated).await?;

        tracing::info!(%user_id, amount, balance = updated.balance, "debited points");
        Ok(updated)
    }
}

impl<B, H> Service<DebitRequest> for PointService<B, H>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryStore + Send + Sync + 'static,
{
    type Response = BalanceRecord;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DebitRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.debit(req.user_id, req.amount).await })
    }
}

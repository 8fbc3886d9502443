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

pub struct CreditRequest {
    pub user_id: UserId,
    pub amount: u64,
}

impl<B, H> PointService<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    /// Add `amount` points to a user's balance
    ///
    /// Returns the balance record as written by the store. One `CREDIT` history entry carrying
    /// the same timestamp is appended before the user's lock is released.
    pub async fn credit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, Error> {
        validate_amount(amount)?;

        let _guard = self.locks.lock(user_id).await;
        let current = self.balances.get(user_id).await?;

        let balance = current
            .balance
            .checked_add(amount)
            .ok_or(Error::BalanceOverflow {
                user_id,
                balance: current.balance,
                amount,
            })?;
        if !self.config.allows(balance) {
            return Err(Error::MaxBalanceExceeded {
                user_id,
                amount,
                max_balance: self.config.max_balance.unwrap_or(u64::MAX),
            });
        }

        let updated = self.balances.put(user_id, balance).await?;
        self.record(amount, TransactionKind::Credit, &updated).await?;

        tracing::info!(%user_id, amount, balance = updated.balance, "credited points");
        Ok(updated)
    }
}

impl<B, H> Service<CreditRequest> for PointService<B, H>
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

    fn call(&mut self, req: CreditRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.credit(req.user_id, req.amount).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::memory::{MemoryBalanceStore, MemoryHistoryStore},
        config::Config,
        lock::KeyLockManager,
        ports::{balance::MockBalanceStore, history::MockHistoryStore},
    };
    use chrono::Utc;
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn user_id() -> UserId {
        UserId(1)
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit(user_id: UserId) {
        // GIVEN
        // * a balance store holding 500 points for the user
        // * a history store expecting exactly one CREDIT entry
        let now = Utc::now();
        let mut balances = MockBalanceStore::new();
        balances
            .expect_get()
            .times(1)
            .with(eq(user_id))
            .returning(move |user_id| {
                Ok(BalanceRecord {
                    user_id,
                    balance: 500,
                    updated_at: now,
                })
            });
        balances
            .expect_put()
            .times(1)
            .with(eq(user_id), eq(1500))
            .returning(move |user_id, balance| {
                Ok(BalanceRecord {
                    user_id,
                    balance,
                    updated_at: now,
                })
            });
        let mut history = MockHistoryStore::new();
        history
            .expect_append()
            .times(1)
            .with(eq(user_id), eq(1000), eq(TransactionKind::Credit), eq(now))
            .returning(|user_id, amount, kind, recorded_at| {
                Ok(crate::domain::HistoryEntry {
                    id: uuid::Uuid::new_v4(),
                    user_id,
                    amount,
                    kind,
                    recorded_at,
                })
            });
        let service = PointService::from_stores(balances, history);

        // WHEN crediting 1000 points
        let res = service.credit(user_id, 1000).await;

        // THEN the returned record is the one written by the store
        assert_that!(res).is_ok().is_equal_to(BalanceRecord {
            user_id,
            balance: 1500,
            updated_at: now,
        });
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_zero_amount(user_id: UserId) {
        // GIVEN stores that must not be touched
        let service = PointService::from_stores(MockBalanceStore::new(), MockHistoryStore::new());

        // WHEN crediting nothing
        let res = service.credit(user_id, 0).await;

        // THEN it is rejected before reaching the stores
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidAmount { amount: 0 }));
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_overflow(user_id: UserId) {
        // GIVEN a balance already at the top of the range
        let mut balances = MockBalanceStore::new();
        balances.expect_get().times(1).returning(|user_id| {
            Ok(BalanceRecord {
                user_id,
                balance: u64::MAX,
                updated_at: Utc::now(),
            })
        });
        balances.expect_put().never();
        let mut history = MockHistoryStore::new();
        history.expect_append().never();
        let service = PointService::from_stores(balances, history);

        // WHEN crediting one more point
        let res = service.credit(user_id, 1).await;

        // THEN nothing is written
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::BalanceOverflow { .. }));
    }

    #[rstest]
    #[case(900, true)]
    #[case(1000, true)]
    #[case(1001, false)]
    #[tokio::test]
    async fn test_credit_max_balance(
        user_id: UserId,
        #[case] amount: u64,
        #[case] accepted: bool,
    ) {
        // GIVEN a policy capping balances at 1000
        let service = PointService::new(
            Arc::new(MemoryBalanceStore::default()),
            Arc::new(MemoryHistoryStore::default()),
            Arc::new(KeyLockManager::new()),
            Config {
                max_balance: Some(1000),
            },
        );

        // WHEN crediting from a zero balance
        let res = service.credit(user_id, amount).await;

        // THEN only amounts within the cap are accepted
        if accepted {
            assert_that!(res).is_ok().matches(|record| record.balance == amount);
        } else {
            assert_that!(res).is_err().matches(|err| {
                matches!(
                    err,
                    Error::MaxBalanceExceeded {
                        max_balance: 1000,
                        ..
                    }
                )
            });
            assert_that!(service.get_balance(user_id).await)
                .is_ok()
                .matches(|record| record.balance == 0);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_history_failure(user_id: UserId) {
        // GIVEN a history store that is unavailable
        let balances = MemoryBalanceStore::default();
        let mut history = MockHistoryStore::new();
        history.expect_append().times(1).returning(|_, _, _, _| {
            Err(crate::ports::history::Error::Adapter(
                "history unavailable".into(),
            ))
        });
        let service = PointService::from_stores(balances.clone(), history);

        // WHEN crediting
        let res = service.credit(user_id, 10).await;

        // THEN
        // * the history error is surfaced unchanged
        // * the balance write that preceded it is not rolled back
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::History(_)));
        assert_that!(balances.get(user_id).await)
            .is_ok()
            .matches(|record| record.balance == 10);
    }

    #[rstest]
    #[tokio::test]
    async fn test_call(user_id: UserId) -> Result<(), BoxError> {
        // GIVEN an empty in-memory setup
        let history = MemoryHistoryStore::default();
        let mut service = PointService::from_stores(MemoryBalanceStore::default(), history.clone());

        // WHEN calling the service
        let req = CreditRequest {
            user_id,
            amount: 250,
        };
        let res = ServiceExt::<CreditRequest>::ready(&mut service)
            .await?
            .call(req)
            .await;

        // THEN
        // * the balance is updated
        // * one CREDIT entry carries the balance timestamp
        assert_that!(res).is_ok().matches(|record| record.balance == 250);
        let record = res?;
        let entries = history.list_by_user(user_id).await?;
        assert_that!(entries).has_length(1);
        assert_that!(entries[0].kind).is_equal_to(TransactionKind::Credit);
        assert_that!(entries[0].recorded_at).is_equal_to(record.updated_at);

        Ok(())
    }
}

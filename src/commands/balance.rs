use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{BalanceRecord, UserId},
    ports::balance::BalanceStore,
};
use tower::Service;

use super::{Error, PointService};

pub struct GetBalanceRequest {
    pub user_id: UserId,
}

impl<B, H> PointService<B, H>
where
    B: BalanceStore,
{
    /// Current balance of a user, zero if the user was never credited
    ///
    /// Does not take the user's lock, so the result may already be stale when it is returned.
    pub async fn get_balance(&self, user_id: UserId) -> Result<BalanceRecord, Error> {
        Ok(self.balances.get(user_id).await?)
    }
}

impl<B, H> Service<GetBalanceRequest> for PointService<B, H>
where
    B: BalanceStore + Send + Sync + 'static,
    H: Send + Sync + 'static,
{
    type Response = BalanceRecord;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetBalanceRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.get_balance(req.user_id).await })
    }
}

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{HistoryEntry, UserId},
    ports::history::HistoryStore,
};
use tower::Service;

use super::{Error, PointService};

pub struct GetHistoryRequest {
    pub user_id: UserId,
}

impl<B, H> PointService<B, H>
where
    H: HistoryStore,
{
    /// Every balance change of a user, oldest first
    ///
    /// Not synchronized with in-flight mutations.
    pub async fn get_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, Error> {
        Ok(self.history.list_by_user(user_id).await?)
    }
}

impl<B, H> Service<GetHistoryRequest> for PointService<B, H>
where
    B: Send + Sync + 'static,
    H: HistoryStore + Send + Sync + 'static,
{
    type Response = Vec<HistoryEntry>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetHistoryRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.get_history(req.user_id).await })
    }
}

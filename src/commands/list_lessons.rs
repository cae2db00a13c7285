use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{domain::Lesson, ports::database::DatabasePort};
use tower::Service;

use super::{DomainLogic, Error};

pub struct ListLessonsRequest;

impl<D> Service<ListLessonsRequest> for DomainLogic<D>
where
    D: DatabasePort + 'static,
{
    type Response = Vec<Lesson>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ListLessonsRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move { Ok(database.list_lessons().await?) })
    }
}

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Order, OrderRequest},
    ports::database::DatabasePort,
};
use tower::Service;

use super::{DomainLogic, Error};

pub struct PlaceOrderRequest {
    pub order: OrderRequest,
}

impl<D> Service<PlaceOrderRequest> for DomainLogic<D>
where
    D: DatabasePort + 'static,
{
    /// The order as it was stored
    type Response = Order;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: PlaceOrderRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            // Validation happens before touching the database
            let order = Order::try_from(req.order)?;

            database.insert_order(order.clone()).await?;

            Ok(order)
        })
    }
}

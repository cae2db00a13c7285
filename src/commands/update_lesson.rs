use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::LessonId,
    ports::database::{DatabasePort, UpdateOutcome},
};
use serde_json::Value;
use tower::Service;

use super::{DomainLogic, Error};

pub struct UpdateLessonRequest {
    pub id: LessonId,
    pub attribute: String,
    pub value: Value,
}

impl<D> Service<UpdateLessonRequest> for DomainLogic<D>
where
    D: DatabasePort + 'static,
{
    type Response = UpdateOutcome;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdateLessonRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let lesson = database
                .find_lesson(req.id)
                .await?
                .ok_or_else(|| Error::LessonNotFound(req.id.to_string()))?;

            // Only attributes the lesson already has may be updated
            if !lesson.has_attribute(&req.attribute) {
                return Err(Error::InvalidAttribute(req.attribute));
            }

            // The lesson may have disappeared since the lookup, in which case nothing matches
            let outcome = database
                .update_lesson_attribute(req.id, req.attribute, req.value)
                .await?;

            Ok(outcome)
        })
    }
}

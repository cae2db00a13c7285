use std::sync::Arc;

pub mod list_lessons;
pub mod place_order;
pub mod update_lesson;

pub struct DomainLogic<D> {
    database: Arc<D>,
}

impl<D> DomainLogic<D> {
    pub fn new(database: Arc<D>) -> Self {
        Self { database }
    }
}

impl<D> Clone for DomainLogic<D> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database port error: {0:?}")]
    Database(#[from] crate::ports::database::Error),

    /// The submitted order failed validation
    #[error(transparent)]
    InvalidOrder(#[from] crate::domain::OrderError),

    #[error("Lesson with id {0} not found")]
    LessonNotFound(String),

    /// The lesson has no such attribute, so it cannot be updated
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),
}

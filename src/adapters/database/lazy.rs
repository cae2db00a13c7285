use crate::{
    domain::{Lesson, LessonId, Order},
    ports::database::{DatabasePort, Error, UpdateOutcome},
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Database handle that becomes usable once a connection has been installed
///
/// The connection is established in the background at startup. Until it is installed, every
/// call fails with [`Error::NotReady`] instead of waiting for it.
#[derive(Default)]
pub struct LazyDatabase {
    inner: OnceLock<Arc<dyn DatabasePort>>,
}

impl LazyDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the connected database
    ///
    /// Only the first installation takes effect; later ones hand the database back.
    pub fn install(&self, database: Arc<dyn DatabasePort>) -> Result<(), Arc<dyn DatabasePort>> {
        self.inner.set(database)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    fn get(&self) -> Result<&dyn DatabasePort, Error> {
        self.inner.get().map(Arc::as_ref).ok_or(Error::NotReady)
    }
}

#[async_trait::async_trait]
impl DatabasePort for LazyDatabase {
    async fn list_lessons(&self) -> Result<Vec<Lesson>, Error> {
        self.get()?.list_lessons().await
    }

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, Error> {
        self.get()?.find_lesson(id).await
    }

    async fn update_lesson_attribute(
        &self,
        id: LessonId,
        attribute: String,
        value: Value,
    ) -> Result<UpdateOutcome, Error> {
        self.get()?
            .update_lesson_attribute(id, attribute, value)
            .await
    }

    async fn insert_order(&self, order: Order) -> Result<(), Error> {
        self.get()?.insert_order(order).await
    }
}

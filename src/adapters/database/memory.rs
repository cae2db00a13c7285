use crate::{
    domain::{Lesson, LessonId, Order},
    ports::database::{DatabasePort, Error, UpdateOutcome},
};
use serde_json::Value;
use std::{
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// In-process store keeping lessons and orders in insertion order
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    lessons: Arc<Mutex<Vec<Lesson>>>,
    orders: Arc<Mutex<Vec<StoredOrder>>>,
}

/// Order record together with the key the store assigned to it
#[derive(Clone, Debug, PartialEq)]
pub struct StoredOrder {
    pub key: Uuid,
    pub order: Order,
}

impl MemoryDatabase {
    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons: Arc::new(Mutex::new(lessons)),
            orders: Arc::default(),
        }
    }

    /// Load the lesson catalog from a JSON file holding an array of lesson records
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|err| Error::Adapter(Box::new(err)))?;
        let lessons: Vec<Lesson> =
            serde_json::from_str(&raw).map_err(|err| Error::Adapter(Box::new(err)))?;
        Ok(Self::with_lessons(lessons))
    }

    pub fn orders(&self) -> Result<Vec<StoredOrder>, Error> {
        Ok(self.orders.lock()?.clone())
    }
}

#[async_trait::async_trait]
impl DatabasePort for MemoryDatabase {
    async fn list_lessons(&self) -> Result<Vec<Lesson>, Error> {
        Ok(self.lessons.lock()?.clone())
    }

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, Error> {
        let lesson = self
            .lessons
            .lock()?
            .iter()
            .find(|lesson| lesson.has_id(id))
            .cloned();

        Ok(lesson)
    }

    async fn update_lesson_attribute(
        &self,
        id: LessonId,
        attribute: String,
        value: Value,
    ) -> Result<UpdateOutcome, Error> {
        let mut lessons = self.lessons.lock()?;
        let Some(lesson) = lessons.iter_mut().find(|lesson| lesson.has_id(id)) else {
            return Ok(UpdateOutcome::new(0, 0));
        };

        let modified = lesson.set_attribute(&attribute, value).unwrap_or(false);
        Ok(UpdateOutcome::new(1, modified as u64))
    }

    async fn insert_order(&self, order: Order) -> Result<(), Error> {
        self.orders.lock()?.push(StoredOrder {
            key: Uuid::new_v4(),
            order,
        });
        Ok(())
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

use serde::Serialize;
use serde_json::Value;

use crate::domain::{Lesson, LessonId, Order};

#[mockall::automock]
#[async_trait::async_trait]
pub trait DatabasePort: Send + Sync {
    /// All lessons, in the store's natural order
    async fn list_lessons(&self) -> Result<Vec<Lesson>, Error>;
    /// Lesson whose numeric `id` attribute equals `id`
    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, Error>;
    /// Set a single attribute on the lesson matching `id`
    ///
    /// This is a field-level update: other attributes are left untouched. If no lesson matches,
    /// the outcome reports zero matched records rather than an error.
    async fn update_lesson_attribute(
        &self,
        id: LessonId,
        attribute: String,
        value: Value,
    ) -> Result<UpdateOutcome, Error>;
    async fn insert_order(&self, order: Order) -> Result<(), Error>;
}

/// Result of a single-record update
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateOutcome {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store connection has not been established (yet)
    #[error("database not ready")]
    NotReady,

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}

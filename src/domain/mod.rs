mod lesson;
mod order;

pub use lesson::{InvalidLessonId, Lesson, LessonId};
pub use order::{Order, OrderError, OrderRequest};

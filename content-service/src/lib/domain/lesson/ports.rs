use async_trait::async_trait;

use crate::lesson::errors::LessonError;
use crate::lesson::models::CreateLessonCommand;
use crate::lesson::models::Lesson;
use crate::lesson::models::LessonSummary;

/// Port for lesson domain service operations.
#[async_trait]
pub trait LessonServicePort: Send + Sync + 'static {
    /// Public catalog listing: titles without bodies.
    async fn catalog(&self) -> Result<Vec<LessonSummary>, LessonError>;

    /// Full lesson listing, newest first.
    async fn list_lessons(&self) -> Result<Vec<Lesson>, LessonError>;

    /// Persist a new lesson.
    async fn create_lesson(&self, command: CreateLessonCommand) -> Result<Lesson, LessonError>;
}

/// Persistence operations for lessons.
#[async_trait]
pub trait LessonRepository: Send + Sync + 'static {
    async fn list_summaries(&self) -> Result<Vec<LessonSummary>, LessonError>;

    async fn list(&self) -> Result<Vec<Lesson>, LessonError>;

    async fn create(&self, lesson: Lesson) -> Result<Lesson, LessonError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::lesson::errors::LessonError;
use crate::lesson::models::CreateLessonCommand;
use crate::lesson::models::Lesson;
use crate::lesson::models::LessonId;
use crate::lesson::models::LessonSummary;
use crate::lesson::ports::LessonRepository;
use crate::lesson::ports::LessonServicePort;

/// Lesson domain service. Authorization happens at the HTTP layer; by the
/// time a call reaches here the gate has already passed.
#[derive(Debug, Clone)]
pub struct LessonService<LR>
where
    LR: LessonRepository,
{
    repository: Arc<LR>,
}

impl<LR> LessonService<LR>
where
    LR: LessonRepository,
{
    pub fn new(repository: Arc<LR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<LR> LessonServicePort for LessonService<LR>
where
    LR: LessonRepository,
{
    async fn catalog(&self) -> Result<Vec<LessonSummary>, LessonError> {
        self.repository.list_summaries().await
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, LessonError> {
        self.repository.list().await
    }

    async fn create_lesson(&self, command: CreateLessonCommand) -> Result<Lesson, LessonError> {
        let lesson = Lesson {
            id: LessonId::new(),
            title: command.title,
            body: command.body,
            created_at: Utc::now(),
        };

        let lesson = self.repository.create(lesson).await?;

        tracing::info!(lesson_id = %lesson.id, "Lesson created");

        Ok(lesson)
    }
}

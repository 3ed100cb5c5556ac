use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::lesson::errors::LessonError;
use crate::lesson::models::Lesson;
use crate::lesson::models::LessonId;
use crate::lesson::models::LessonSummary;
use crate::lesson::models::LessonTitle;
use crate::lesson::ports::LessonRepository;

pub struct PostgresLessonRepository {
    pool: PgPool,
}

impl PostgresLessonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Lesson, LessonError> {
        Ok(Lesson {
            id: LessonId::from_uuid(row.try_get::<Uuid, _>("id").map_db_err()?),
            title: LessonTitle::new(row.try_get("title").map_db_err()?)?,
            body: row.try_get("body").map_db_err()?,
            created_at: row.try_get("created_at").map_db_err()?,
        })
    }

    fn map_summary_row(row: &PgRow) -> Result<LessonSummary, LessonError> {
        Ok(LessonSummary {
            id: LessonId::from_uuid(row.try_get::<Uuid, _>("id").map_db_err()?),
            title: LessonTitle::new(row.try_get("title").map_db_err()?)?,
            created_at: row.try_get("created_at").map_db_err()?,
        })
    }
}

trait MapDbErr<T> {
    fn map_db_err(self) -> Result<T, LessonError>;
}

impl<T> MapDbErr<T> for Result<T, sqlx::Error> {
    fn map_db_err(self) -> Result<T, LessonError> {
        self.map_err(|e| LessonError::Database(e.to_string()))
    }
}

#[async_trait]
impl LessonRepository for PostgresLessonRepository {
    async fn list_summaries(&self) -> Result<Vec<LessonSummary>, LessonError> {
        let rows =
            sqlx::query("SELECT id, title, created_at FROM lessons ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_db_err()?;

        rows.iter().map(Self::map_summary_row).collect()
    }

    async fn list(&self) -> Result<Vec<Lesson>, LessonError> {
        let rows =
            sqlx::query("SELECT id, title, body, created_at FROM lessons ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_db_err()?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn create(&self, lesson: Lesson) -> Result<Lesson, LessonError> {
        sqlx::query("INSERT INTO lessons (id, title, body, created_at) VALUES ($1, $2, $3, $4)")
            .bind(lesson.id.as_uuid())
            .bind(lesson.title.as_str())
            .bind(&lesson.body)
            .bind(lesson.created_at)
            .execute(&self.pool)
            .await
            .map_db_err()?;

        Ok(lesson)
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LessonTitleError {
    #[error("Lesson title cannot be empty")]
    Empty,

    #[error("Lesson title cannot exceed {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error)]
pub enum LessonError {
    #[error("Invalid lesson title: {0}")]
    InvalidTitle(#[from] LessonTitleError),

    #[error("Lesson not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for LessonError {
    fn from(e: anyhow::Error) -> Self {
        LessonError::Database(e.to_string())
    }
}

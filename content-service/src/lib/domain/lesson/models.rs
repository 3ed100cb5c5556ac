use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::lesson::errors::LessonTitleError;

/// A single lesson in the catalog. Deliberately thin: the service exists to
/// exercise authorization, not content management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub title: LessonTitle,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a lesson: everything except the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub id: LessonId,
    pub title: LessonTitle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonId(Uuid);

impl LessonId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LessonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonTitle(String);

impl LessonTitle {
    const MAX_LENGTH: usize = 200;

    pub fn new(title: String) -> Result<Self, LessonTitleError> {
        let title = title.trim().to_string();
        let length = title.chars().count();

        if length == 0 {
            Err(LessonTitleError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(LessonTitleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(LessonTitle(title))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLessonCommand {
    pub title: LessonTitle,
    pub body: String,
}

impl CreateLessonCommand {
    pub fn new(title: LessonTitle, body: String) -> Self {
        Self { title, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_trimmed() {
        let title = LessonTitle::new("  Intro to Ownership  ".to_string()).unwrap();
        assert_eq!(title.as_str(), "Intro to Ownership");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert_eq!(
            LessonTitle::new("   ".to_string()),
            Err(LessonTitleError::Empty)
        );
    }

    #[test]
    fn test_overlong_title_rejected() {
        let result = LessonTitle::new("x".repeat(201));
        assert!(matches!(result, Err(LessonTitleError::TooLong { .. })));
    }
}

pub mod lesson;
pub mod subscription;

pub use lesson::PostgresLessonRepository;
pub use subscription::PostgresSubscriptionProbe;

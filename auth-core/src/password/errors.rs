use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    /// The underlying hashing primitive could not run (resource exhaustion
    /// or invalid cost parameters). Well-formed input never produces this.
    #[error("Password hashing unavailable: {0}")]
    HashingUnavailable(String),
}

use thiserror::Error;

/// Error type for session token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Input is not a structurally valid token.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Structure is valid but the signature does not match the signing key.
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Signature is valid but the token is past its expiry. No grace period.
    #[error("Token is expired")]
    Expired,

    /// The handler could not be constructed or could not sign. A missing or
    /// empty signing key is a configuration fault, fatal at service startup.
    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),
}

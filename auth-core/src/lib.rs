//! Shared credential and authorization library
//!
//! Provides the authentication core used identically by every service:
//! - Password hashing (Argon2id, configurable cost)
//! - Session token issuance and validation (HS256 JWT)
//! - Authorization gate (role and subscription predicates)
//! - Reset-secret generation and hashing
//! - Bearer/cookie credential extraction
//!
//! Services consume these implementations directly so that authorization
//! decisions made redundantly across process boundaries cannot drift. Each
//! service re-validates inbound tokens locally; nothing here trusts an
//! upstream peer's validation.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth_core::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(2);
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth_core::{Role, SubscriptionStatus, TokenHandler};
//! use chrono::Duration;
//!
//! let handler = TokenHandler::new("secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let token = handler.issue("account-id", Role::User, SubscriptionStatus::None).unwrap();
//! let claims = handler.validate(&token).unwrap();
//! assert_eq!(claims.sub, "account-id");
//! ```

pub mod credentials;
pub mod gate;
pub mod password;
pub mod reset;
pub mod token;

// Re-export commonly used items
pub use gate::ForbiddenReason;
pub use gate::GateError;
pub use gate::GatePolicy;
pub use gate::StoreError;
pub use gate::SubscriptionProbe;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Role;
pub use token::SessionClaims;
pub use token::SubscriptionStatus;
pub use token::TokenError;
pub use token::TokenHandler;

use std::fmt;
use std::str::FromStr;

use auth_core::Role;
use auth_core::SubscriptionStatus;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::FullNameError;

/// Account aggregate entity.
///
/// The durable credential record: identity, password hash, role,
/// subscription status, and reset-token material. The password hash and
/// reset token never appear in any external response.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub password_hash: String,
    pub role: Role,
    pub subscription: SubscriptionStatus,
    pub reset_token: Option<ResetToken>,
    pub created_at: DateTime<Utc>,
}

/// Outstanding reset-token material: the secret's one-way hash and expiry.
///
/// Modeled as a single value so the hash and expiry are present or absent
/// together; the store writes and clears both in one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address identity type.
///
/// Case-normalized (trimmed, lowercased) before validation so lookups and
/// uniqueness checks agree regardless of how the caller typed it. Immutable
/// after account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new normalized, validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name, 5-50 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    const MIN_LENGTH: usize = 5;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Name shorter than 5 characters
    /// * `TooLong` - Name longer than 50 characters
    pub fn new(name: String) -> Result<Self, FullNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();

        if length < Self::MIN_LENGTH {
            Err(FullNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(FullNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub full_name: FullName,
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    pub fn new(full_name: FullName, email: EmailAddress, password: String) -> Self {
        Self {
            full_name,
            email,
            password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = EmailAddress::new("  Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
        assert!(EmailAddress::new("".to_string()).is_err());
    }

    #[test]
    fn test_full_name_bounds() {
        assert!(matches!(
            FullName::new("abc".to_string()),
            Err(FullNameError::TooShort { .. })
        ));
        assert!(matches!(
            FullName::new("x".repeat(51)),
            Err(FullNameError::TooLong { .. })
        ));
        assert_eq!(
            FullName::new("  Alice Smith  ".to_string()).unwrap().as_str(),
            "Alice Smith"
        );
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Account role, a closed set. Default is `User`; only privileged mutation
/// paths may change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Subscription state as recorded on the account.
///
/// The value embedded in a claim is a snapshot at issuance; the gate
/// re-fetches the current value for subscriber-only checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    None,
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::None => "none",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SubscriptionStatus::None),
            "active" => Ok(SubscriptionStatus::Active),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::None
    }
}

/// Payload embedded in an issued session token.
///
/// Immutable once issued: role or subscription changes take effect only on
/// the next issuance. The signature covers every field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: account identifier.
    pub sub: String,

    /// Role snapshot at issuance.
    pub role: Role,

    /// Subscription snapshot at issuance. Display only; never trusted for
    /// subscriber-only authorization.
    pub subscription: SubscriptionStatus,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp), `iat + ttl`.
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims for an account with expiry `now + ttl`.
    pub fn new(
        sub: impl Into<String>,
        role: Role,
        subscription: SubscriptionStatus,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            role,
            subscription,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims_expiry_window() {
        let claims = SessionClaims::new(
            "account-1",
            Role::User,
            SubscriptionStatus::None,
            Duration::hours(24),
        );

        assert_eq!(claims.sub, "account-1");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::User.as_str(), "USER");
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_subscription_round_trip() {
        assert_eq!(
            "active".parse::<SubscriptionStatus>(),
            Ok(SubscriptionStatus::Active)
        );
        assert_eq!(SubscriptionStatus::Canceled.as_str(), "canceled");
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn test_claims_serialize_wire_names() {
        let claims = SessionClaims::new(
            "account-1",
            Role::Admin,
            SubscriptionStatus::Active,
            Duration::minutes(5),
        );

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["role"], "ADMIN");
        assert_eq!(value["subscription"], "active");
    }
}

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Role;
use super::claims::SessionClaims;
use super::claims::SubscriptionStatus;
use super::errors::TokenError;

/// Issues and validates session tokens.
///
/// HS256 over the full claim payload; any payload mutation invalidates the
/// signature. Holds only read-only key material, so a single instance is
/// safely shared across concurrent requests.
pub struct TokenHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenHandler {
    /// Create a token handler from the signing key and token time-to-live.
    ///
    /// # Errors
    /// * `IssuanceFailed` - The signing key is empty. Services treat this as
    ///   fatal at startup, not per-request.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::IssuanceFailed(
                "signing key is missing or empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            ttl,
        })
    }

    /// Issue a signed session token for an account.
    ///
    /// Stamps issued-at and expiry (`now + ttl`) into the claims. The output
    /// is an opaque compact string safe for header or cookie transport.
    ///
    /// # Errors
    /// * `IssuanceFailed` - Signing failed
    pub fn issue(
        &self,
        account_id: impl Into<String>,
        role: Role,
        subscription: SubscriptionStatus,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims::new(account_id, role, subscription, self.ttl);
        self.issue_claims(&claims)
    }

    /// Sign already-built claims. Used by tests that need a custom window.
    pub fn issue_claims(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::IssuanceFailed(e.to_string()))
    }

    /// Validate an inbound token and return the embedded claims.
    ///
    /// Checks run in order: structure, signature, then expiry with zero
    /// leeway. Every service performing a protected operation calls this
    /// locally; an upstream peer's validation is never trusted.
    ///
    /// # Errors
    /// * `Malformed` - Input is not a structurally valid token
    /// * `InvalidSignature` - Signature does not match the signing key
    /// * `Expired` - `now >= exp`
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        // The library's expiry check is `exp < now`, which still accepts a
        // token during its expiry second. A token is valid strictly before
        // `exp`, never at it.
        if Utc::now().timestamp() >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_at_least_32_bytes!";

    fn handler() -> TokenHandler {
        TokenHandler::new(SECRET, Duration::hours(1)).expect("Failed to build handler")
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let handler = handler();

        let token = handler
            .issue("account-1", Role::User, SubscriptionStatus::Active)
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = handler.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.sub, "account-1");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.subscription, SubscriptionStatus::Active);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        let result = TokenHandler::new("", Duration::hours(1));
        assert!(matches!(result, Err(TokenError::IssuanceFailed(_))));

        let result = TokenHandler::new("   ", Duration::hours(1));
        assert!(matches!(result, Err(TokenError::IssuanceFailed(_))));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuer = handler();
        let validator = TokenHandler::new("another_secret_key_32_bytes_long!!", Duration::hours(1))
            .expect("Failed to build handler");

        let token = issuer
            .issue("account-1", Role::User, SubscriptionStatus::None)
            .expect("Failed to issue token");

        assert_eq!(
            validator.validate(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_validate_expired_token() {
        let handler = handler();

        let mut claims = SessionClaims::new(
            "account-1",
            Role::User,
            SubscriptionStatus::None,
            Duration::hours(1),
        );
        claims.iat -= 7200;
        claims.exp -= 7200;

        let token = handler
            .issue_claims(&claims)
            .expect("Failed to issue token");

        assert_eq!(handler.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_validate_rejects_at_exact_expiry_instant() {
        let handler = handler();

        // Expiry stamped to the current second: already invalid, with no
        // grace period.
        let mut claims = SessionClaims::new(
            "account-1",
            Role::User,
            SubscriptionStatus::None,
            Duration::hours(1),
        );
        claims.exp = chrono::Utc::now().timestamp();
        claims.iat = claims.exp - 3600;

        let token = handler
            .issue_claims(&claims)
            .expect("Failed to issue token");

        assert_eq!(handler.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_validate_malformed_token() {
        let handler = handler();

        assert!(matches!(
            handler.validate("not.a.token"),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            handler.validate(""),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let handler = handler();

        let token = handler
            .issue("account-1", Role::User, SubscriptionStatus::None)
            .expect("Failed to issue token");

        // Swap the payload segment for a different (validly encoded) one.
        let other = handler
            .issue("account-2", Role::Admin, SubscriptionStatus::Active)
            .expect("Failed to issue token");

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(handler.validate(&forged), Err(TokenError::InvalidSignature));
    }
}

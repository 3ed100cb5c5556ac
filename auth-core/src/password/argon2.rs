use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Argon2id with a random per-call salt. The iteration cost is injected
/// configuration so services tune it in one place; memory and parallelism
/// use the library defaults.
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Default iteration cost used when configuration does not override it.
    pub const DEFAULT_COST: u32 = 2;

    /// Create a password hasher with the given iteration cost.
    ///
    /// A cost of zero is raised to one; Argon2 rejects it otherwise.
    pub fn new(cost: u32) -> Self {
        Self { cost: cost.max(1) }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| PasswordError::HashingUnavailable(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a plaintext password securely.
    ///
    /// The salt is freshly generated, so hashing the same plaintext twice
    /// yields different outputs.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingUnavailable` - The hashing primitive could not run
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingUnavailable(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Comparison is constant-time inside the Argon2 verifier. A malformed
    /// stored hash verifies as `false` rather than erroring, so callers get
    /// a single uniform refusal path.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(PasswordHasher::DEFAULT_COST);
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = PasswordHasher::default();

        let first = hasher.hash("repeated").expect("Failed to hash password");
        let second = hasher.hash("repeated").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify("repeated", &first));
        assert!(hasher.verify("repeated", &second));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        let hasher = PasswordHasher::default();

        assert!(!hasher.verify("password", "not_a_phc_string"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_zero_cost_is_clamped() {
        let hasher = PasswordHasher::new(0);
        let hash = hasher.hash("password").expect("Failed to hash password");
        assert!(hasher.verify("password", &hash));
    }
}

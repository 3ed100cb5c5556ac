//! Reset-secret primitives.
//!
//! A reset secret is a high-entropy random value transmitted to the account
//! holder exactly once. Only its one-way hash is ever persisted; redemption
//! hashes the presented secret and matches against the stored hash.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// Entropy of a reset secret in bytes (hex-encoded to twice this length).
pub const SECRET_BYTES: usize = 20;

/// Generate a fresh plaintext reset secret.
///
/// The caller hands this to the notification collaborator and must not
/// persist it; store only [`hash_secret`] of it.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-way hash of a reset secret, as stored on the account record.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_format() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_hash_is_deterministic_and_one_way() {
        let secret = generate_secret();
        let hash = hash_secret(&secret);

        assert_eq!(hash, hash_secret(&secret));
        assert_ne!(hash, secret);
        assert_eq!(hash.len(), 64); // sha256 hex digest
    }
}

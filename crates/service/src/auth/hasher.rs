use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// One-way password hashing over Argon2id with a fresh salt per call.
///
/// Hashing is deliberately slow and adaptive; a fast digest would make
/// offline brute force cheap.
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher;

impl CredentialHasher {
    /// Produce a salted PHC-format hash. Two calls with the same plaintext
    /// yield different strings.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Constant-time verification. A malformed stored hash counts as a
    /// mismatch rather than an error.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match PasswordHash::new(hashed) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

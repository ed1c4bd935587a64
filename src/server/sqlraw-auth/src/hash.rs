//! Password hash verification.
//!
//! Stored hashes are self-describing: the prefix names the algorithm and the
//! rest carries salt and cost. Supported families:
//!
//! - Argon2 in PHC format (`$argon2id$`, `$argon2i$`, `$argon2d$`)
//! - bcrypt in modular crypt format (`$2y$`, `$2b$`, `$2a$`, `$2x$`)
//! - SHA-crypt in modular crypt format (`$5$` SHA-256, `$6$` SHA-512),
//!   with or without a `rounds=` parameter
//!
//! MD5-crypt (`$1$`) and DES crypt are not accepted.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Hash families recognised by [`verify_password`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// Argon2 (PHC string format).
    Argon2,
    /// bcrypt (modular crypt format).
    Bcrypt,
    /// SHA-256-crypt (`$5$`).
    Sha256Crypt,
    /// SHA-512-crypt (`$6$`).
    Sha512Crypt,
}

impl HashScheme {
    /// Detects the scheme from the hash prefix.
    pub fn detect(hash: &str) -> Option<Self> {
        if hash.starts_with("$argon2") {
            Some(Self::Argon2)
        } else if ["$2y$", "$2b$", "$2a$", "$2x$"]
            .iter()
            .any(|prefix| hash.starts_with(prefix))
        {
            Some(Self::Bcrypt)
        } else if hash.starts_with("$5$") {
            Some(Self::Sha256Crypt)
        } else if hash.starts_with("$6$") {
            Some(Self::Sha512Crypt)
        } else {
            None
        }
    }
}

/// Verifies a plaintext password against a stored hash.
///
/// Unknown formats and malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match HashScheme::detect(hash) {
        Some(HashScheme::Argon2) => {
            let Ok(parsed_hash) = PasswordHash::new(hash) else {
                return false;
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        },
        Some(HashScheme::Bcrypt) => bcrypt::verify(password, hash).unwrap_or(false),
        Some(HashScheme::Sha256Crypt) => sha_crypt::sha256_check(password, hash).is_ok(),
        Some(HashScheme::Sha512Crypt) => sha_crypt::sha512_check(password, hash).is_ok(),
        None => false,
    }
}

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

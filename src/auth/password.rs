/// Password Hashing and Verification
///
/// bcrypt only reads the first 72 bytes of its input. Passwords are cut to
/// that length on a UTF-8 boundary before hashing and before verifying, so
/// two passwords sharing the same 72-byte prefix verify as equal.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// Maximum number of password bytes bcrypt consumes
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Cost range bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Truncate a password to at most 72 bytes without splitting a character.
///
/// A multi-byte character that would straddle the limit is dropped whole.
pub fn truncate_password(password: &str) -> &str {
    if password.len() <= BCRYPT_MAX_PASSWORD_BYTES {
        return password;
    }

    let mut end = BCRYPT_MAX_PASSWORD_BYTES;
    while !password.is_char_boundary(end) {
        end -= 1;
    }
    &password[..end]
}

/// Salted one-way hashing of user credentials
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password with bcrypt
    ///
    /// # Errors
    /// Returns error if bcrypt rejects the cost or fails to generate a salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(truncate_password(password), self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    ///
    /// A stored hash bcrypt cannot parse counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match verify(truncate_password(password), hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be verified");
                false
            }
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

//! Password value object - hashing, verification and strength policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Hash that never verifies; used so unknown emails cost the same as wrong passwords.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$ZHVtbXloYXNoMTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMg";

/// Hashed password.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain-text password that satisfies the policy.
    ///
    /// # Errors
    /// Returns a validation error on `field` when the policy is not met.
    pub fn new(plain_text: &str, field: &str) -> AppResult<Self> {
        let problems = Self::policy_violations(plain_text);
        if !problems.is_empty() {
            let mut errors = crate::errors::FieldErrors::new();
            for problem in problems {
                errors.add(field, problem);
            }
            return Err(AppError::invalid(errors));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Messages for every rule the password breaks.
    pub fn policy_violations(plain_text: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ));
        }
        if !plain_text.is_empty() && plain_text.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }
        problems
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Stand-in for a missing account during login.
    pub fn dummy() -> Self {
        Self::from_hash(DUMMY_HASH.to_string())
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain, "password").unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let password = Password::new(plain, "password").unwrap();

        let restored = Password::from_hash(password.as_str().to_string());
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain, "password").unwrap();
        let pass2 = Password::new(plain, "password").unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_password_too_short_reported_on_field() {
        let err = Password::new("short", "new_password").unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("new_password").unwrap().len(), 1);
    }

    #[test]
    fn test_entirely_numeric_rejected() {
        let problems = Password::policy_violations("12345678");
        assert_eq!(problems, vec!["This password is entirely numeric.".to_string()]);
    }

    #[test]
    fn test_dummy_never_verifies() {
        assert!(!Password::dummy().verify(""));
        assert!(!Password::dummy().verify("anything-at-all"));
    }
}

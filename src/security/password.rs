//! Password hashing and verification.
//!
//! Centralizes Argon2 handling for player accounts. Stored hashes are PHC
//! strings; verification takes the stored string and parses it here so
//! callers never touch `PasswordHash` directly.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};

/// Hash a password using default Argon2 settings.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// An unparseable stored hash verifies as `false` rather than erroring:
/// from the login flow's point of view it is simply a wrong password.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("swordfish").unwrap();
        assert!(verify_password("swordfish", &hash));
        assert!(!verify_password("Swordfish", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("swordfish").unwrap();
        let b = hash_password("swordfish").unwrap();
        assert_ne!(a, b);
    }
}

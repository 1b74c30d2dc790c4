//! Argon2id password hashing.

use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use tracing::error;

use crate::error::Error;

/// Hash `plain` into a PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(plain.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Password(e.to_string()))
}

/// Constant-time check of `plain` against a stored PHC string.
///
/// An unparseable stored hash never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
  let parsed = match PasswordHash::new(hash) {
    Ok(parsed) => parsed,
    Err(e) => {
      error!(error = %e, "stored password hash is not a valid PHC string");
      return false;
    }
  };
  Argon2::default()
    .verify_password(plain.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_and_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("battery staple", &hash));
  }

  #[test]
  fn salts_differ_per_hash() {
    assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
    assert!(!verify_password("", ""));
  }
}

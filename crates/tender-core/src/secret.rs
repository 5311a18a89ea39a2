//! One-way derivation of the billing postal code.
//!
//! Only the first five characters of the zip are kept, and only as a salted
//! Argon2id hash. The hash lets a later request be matched against the card's
//! billing zip for fraud checks without the plaintext ever being stored.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};

/// Number of leading zip characters that are hashed.
pub const ZIP_PREFIX_LEN: usize = 5;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// A PHC-format Argon2id hash of a five-character zip prefix.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zip5Hash(String);

impl Zip5Hash {
    /// Wrap a hash previously read from storage.
    #[must_use]
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// The PHC string, as persisted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `zip` has the same five-character prefix this hash was
    /// derived from.
    ///
    /// Zips shorter than five characters and unparseable stored hashes never
    /// verify.
    #[must_use]
    pub fn verify(&self, zip: &str) -> bool {
        let Some(prefix) = zip_prefix(zip) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(prefix.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for Zip5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Zip5Hash(<argon2id>)")
    }
}

/// Derive the stored hash for a billing zip.
///
/// # Errors
///
/// - `PaymentError::InvalidZip` if fewer than five characters are supplied.
/// - `PaymentError::SecretDerivation` if the hasher fails.
pub fn derive_zip5_hash(zip: &str) -> Result<Zip5Hash> {
    let prefix = zip_prefix(zip).ok_or(PaymentError::InvalidZip {
        required: ZIP_PREFIX_LEN,
    })?;

    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| PaymentError::SecretDerivation(e.to_string()))?;

    Argon2::default()
        .hash_password(prefix.as_bytes(), &salt)
        .map(|hash| Zip5Hash(hash.to_string()))
        .map_err(|e| PaymentError::SecretDerivation(e.to_string()))
}

/// First five characters of the zip, counted as `char`s so multi-byte input
/// is never split mid-character.
fn zip_prefix(zip: &str) -> Option<String> {
    let zip = zip.trim();
    if zip.chars().count() < ZIP_PREFIX_LEN {
        return None;
    }
    Some(zip.chars().take(ZIP_PREFIX_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_same_prefix() {
        let hash = derive_zip5_hash("94107").unwrap();
        assert!(hash.verify("94107"));
        assert!(hash.verify("94107-1234"));
        assert!(!hash.verify("94108"));
    }

    #[test]
    fn hashing_twice_yields_distinct_strings_that_both_verify() {
        let a = derive_zip5_hash("10001").unwrap();
        let b = derive_zip5_hash("10001").unwrap();
        assert_ne!(a, b);
        assert!(a.verify("10001"));
        assert!(b.verify("10001"));
    }

    #[test]
    fn stored_form_never_contains_plaintext() {
        let hash = derive_zip5_hash("94107-0001").unwrap();
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(!hash.as_str().contains("94107"));
        assert!(!format!("{hash:?}").contains("94107"));
    }

    #[test]
    fn short_zip_is_rejected() {
        let err = derive_zip5_hash("9410").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidZip { required: 5 }));
        assert!(matches!(
            derive_zip5_hash("   ").unwrap_err(),
            PaymentError::InvalidZip { .. }
        ));
    }

    #[test]
    fn only_first_five_characters_matter() {
        let hash = derive_zip5_hash("SW1A 1AA").unwrap();
        assert!(hash.verify("SW1A 2BB"));
        assert!(!hash.verify("SW1B 1AA"));
    }

    #[test]
    fn short_or_garbage_input_never_verifies() {
        let hash = derive_zip5_hash("94107").unwrap();
        assert!(!hash.verify("941"));
        assert!(!Zip5Hash::from_stored("not-a-phc-string").verify("94107"));
    }
}

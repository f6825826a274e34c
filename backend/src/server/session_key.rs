//! Cookie key derivation and fingerprinting.
//!
//! The configured secret may be any length, so it is stretched to the 64
//! bytes `Key` expects with SHA-512. Operators can compare the logged
//! fingerprint across instances without seeing key material.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256, Sha512};

use super::config::{SessionSecret, SettingsError};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Derive the signing and encryption key from `secret`.
///
/// # Examples
/// ```
/// use portal::server::{SessionSecret, derive_key, key_fingerprint};
///
/// let a = derive_key(&SessionSecret::new("correct horse battery staple"))?;
/// let b = derive_key(&SessionSecret::new("correct horse battery staple"))?;
/// assert_eq!(key_fingerprint(&a), key_fingerprint(&b));
/// # Ok::<(), portal::server::SettingsError>(())
/// ```
pub fn derive_key(secret: &SessionSecret) -> Result<Key, SettingsError> {
    let digest = Sha512::digest(secret.expose());
    Key::try_from(digest.as_slice()).map_err(|err| SettingsError::Key(err.to_string()))
}

/// First 8 bytes of the SHA-256 of the signing key, hex encoded.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.signing());
    let result = hasher.finalize();
    hex::encode(&result[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn derivation_is_deterministic() {
        let a = derive_key(&SessionSecret::new(vec![b'a'; 40])).expect("derive");
        let b = derive_key(&SessionSecret::new(vec![b'a'; 40])).expect("derive");
        assert_eq!(a.master(), b.master());
    }

    #[rstest]
    fn different_secrets_give_different_fingerprints() {
        let a = derive_key(&SessionSecret::new("first secret")).expect("derive");
        let b = derive_key(&SessionSecret::new("second secret")).expect("derive");
        assert_ne!(key_fingerprint(&a), key_fingerprint(&b));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(200)]
    fn any_secret_length_derives(#[case] len: usize) {
        assert!(derive_key(&SessionSecret::new(vec![7u8; len])).is_ok());
    }

    #[rstest]
    fn fingerprint_is_sixteen_hex_chars() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

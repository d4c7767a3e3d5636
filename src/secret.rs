// Adapted from the key type in cookie-rs: https://github.com/rwf2/cookie-rs/blob/ba46fc5e97a1271435f38509d109e125a473bc82/src/secure/key.rs
use std::{convert::TryFrom, sync::Arc};

const GENERATED_LENGTH: usize = 64;

/// Shared secret used to sign and verify thumbnail requests.
///
/// The secret is cheap to clone and never printed by its `Debug`
/// implementation.
#[derive(Clone, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct Secret(Arc<[u8]>);

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;

        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Secret {}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret").finish()
    }
}

impl Secret {
    /// Creates a new `Secret` from the given bytes.
    ///
    /// # Panics
    ///
    /// Panics if `secret` is empty. For a non-panicking version, use
    /// [`Secret::try_from()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use thumbnail_signature::Secret;
    ///
    /// let secret = Secret::from(b"shared secret from configuration");
    /// ```
    #[inline]
    pub fn from(secret: impl AsRef<[u8]>) -> Secret {
        Secret::try_from(secret.as_ref()).unwrap()
    }

    /// Generates a 512-bit secret from a secure, random source.
    ///
    /// # Panics
    ///
    /// Panics if randomness cannot be retrieved from the operating system. See
    /// [`Secret::try_generate()`] for a non-panicking version.
    ///
    /// # Example
    ///
    /// ```rust
    /// use thumbnail_signature::Secret;
    ///
    /// let secret = Secret::generate();
    /// assert_eq!(secret.as_slice().len(), 64);
    /// ```
    pub fn generate() -> Secret {
        Self::try_generate().expect("failed to generate `Secret` from randomness")
    }

    /// Attempts to generate a 512-bit secret from a secure, random source.
    /// Returns `None` if randomness cannot be retrieved from the operating
    /// system.
    pub fn try_generate() -> Option<Secret> {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let mut bytes = [0; GENERATED_LENGTH];
        rng.try_fill_bytes(&mut bytes).ok()?;
        Some(Secret(Arc::from(&bytes[..])))
    }

    /// Returns the secret as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// Error returned when secret material is unusable.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SecretError {
    /// No secret material was provided.
    #[error("shared secret must not be empty")]
    Empty,
}

impl TryFrom<&[u8]> for Secret {
    type Error = SecretError;

    /// A fallible version of [`Secret::from()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// # use std::convert::TryFrom;
    /// use thumbnail_signature::Secret;
    ///
    /// assert!(Secret::try_from(&b"s3cr3t"[..]).is_ok());
    /// assert!(Secret::try_from(&b""[..]).is_err());
    /// ```
    fn try_from(secret: &[u8]) -> Result<Self, Self::Error> {
        if secret.is_empty() {
            Err(SecretError::Empty)
        } else {
            Ok(Secret(Arc::from(secret)))
        }
    }
}

impl TryFrom<String> for Secret {
    type Error = SecretError;

    fn try_from(secret: String) -> Result<Self, Self::Error> {
        Secret::try_from(secret.as_bytes())
    }
}

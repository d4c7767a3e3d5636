//! URL-safe, unpadded Base64 codec for request parameters.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use url::Url;

/// Error returned when an encoded parameter cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Input was not URL-safe, unpadded Base64.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes were not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode `raw` with the URL-safe alphabet and no padding.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::codec;
///
/// assert_eq!(codec::encode("http://www.example.com"), "aHR0cDovL3d3dy5leGFtcGxlLmNvbQ");
/// ```
pub fn encode(raw: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

/// Decode a value produced by [`encode`] back into a string.
///
/// Padding, characters outside the URL-safe alphabet and invalid lengths are
/// all rejected.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::codec;
///
/// let decoded = codec::decode("aHR0cDovL3d3dy5leGFtcGxlLmNvbQ")?;
/// assert_eq!(decoded, "http://www.example.com");
///
/// assert!(codec::decode("not base64!").is_err());
/// # Ok::<(), codec::DecodeError>(())
/// ```
pub fn decode(encoded: &str) -> Result<String, DecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Returns `true` if `candidate` is an absolute `http` or `https` URL with a
/// non-empty host.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::codec::check_url_validity;
///
/// assert!(check_url_validity("http://www.example.com"));
/// assert!(!check_url_validity("abcdefg"));
/// ```
pub fn check_url_validity(candidate: &str) -> bool {
    parse_target(candidate).is_some()
}

pub(crate) fn parse_target(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use url::Url;

use crate::{
    codec,
    params::{Height, ThumbnailRequestParams, Width},
    policy::MAX_DIMENSION,
    Secret,
};

/// Deterministic serialization of the signed request fields.
///
/// Fields are joined with `/` in the order encoded URL, max width, max
/// height, extension. The signature itself is never part of the payload.
/// Signers and verifiers must agree on this layout exactly.
///
/// The layout is only unambiguous while neither the encoded URL nor the
/// extension contains `/`; [`validate_signature_base64`] rejects parameters
/// that do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    /// Build the payload for `params`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use thumbnail_signature::{CanonicalPayload, ThumbnailRequestParams};
    ///
    /// let params = ThumbnailRequestParams::new("dXJs", 600, 400, "gif", "ignored");
    /// let payload = CanonicalPayload::from_params(&params);
    ///
    /// assert_eq!(payload.as_str(), "dXJs/600/400/gif");
    /// ```
    pub fn from_params(params: &ThumbnailRequestParams) -> Self {
        Self(format!(
            "{}/{}/{}/{}",
            params.url_encoded(),
            params.max_width(),
            params.max_height(),
            params.extension()
        ))
    }

    /// Returns the payload as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sign `payload` with `secret`.
///
/// Returns the HMAC-SHA256 digest of the payload, encoded with
/// [`codec::encode`]. Producing a signature and computing the expected one
/// during verification both go through this function.
pub fn sign(payload: &CanonicalPayload, secret: &Secret) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_slice())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_str().as_bytes());
    codec::encode(mac.finalize().into_bytes())
}

/// Returns `true` if the signature carried by `params` was produced with
/// `secret` over the same request fields.
///
/// The comparison runs in constant time. Malformed and wrong signatures are
/// indistinguishable to the caller. Parameters whose encoded URL or
/// extension contains the `/` separator are always rejected, since their
/// payload could collide with that of different parameters.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::{
///     codec, sign, validate_signature_base64, CanonicalPayload, Secret, ThumbnailRequestParams,
/// };
///
/// let secret = Secret::from("shared secret");
/// let url = codec::encode("http://www.example.com");
///
/// let unsigned = ThumbnailRequestParams::new(url.as_str(), 600, 600, "gif", "");
/// let signature = sign(&CanonicalPayload::from_params(&unsigned), &secret);
/// let params = ThumbnailRequestParams::new(url.as_str(), 600, 600, "gif", signature);
///
/// assert!(validate_signature_base64(&params, &secret));
/// assert!(!validate_signature_base64(&params, &Secret::from("another secret")));
/// ```
pub fn validate_signature_base64(params: &ThumbnailRequestParams, secret: &Secret) -> bool {
    if params.url_encoded().contains('/') || params.extension().contains('/') {
        tracing::debug!("separator in signed field");
        return false;
    }

    let expected = sign(&CanonicalPayload::from_params(params), secret);
    let matches: bool = expected
        .as_bytes()
        .ct_eq(params.signature_encoded().as_bytes())
        .into();

    if !matches {
        tracing::debug!("signature mismatch");
    }

    matches
}

/// Verifier of request signatures.
#[derive(Debug, Clone)]
pub struct Verifier {
    secret: Secret,
}

impl Verifier {
    /// Create a new [`Verifier`] with the provided [`Secret`].
    pub const fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Verify the signature carried by `params`.
    ///
    /// See [`validate_signature_base64`].
    pub fn verify(&self, params: &ThumbnailRequestParams) -> bool {
        validate_signature_base64(params, &self.secret)
    }
}

/// Transform parameters covered by a signature.
///
/// This is the parameter state of a [`SignedUrlBuilder`] after
/// [`SignedUrlBuilder::params`]; it is set through the builder and read back
/// from [`SignedUrl::params`]. Dimensions default to the policy maximum and
/// the extension to `png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationParams {
    max_width: Width,
    max_height: Height,
    extension: String,
}

impl TransformationParams {
    /// Maximum width.
    pub fn max_width(&self) -> Width {
        self.max_width
    }

    /// Maximum height.
    pub fn max_height(&self) -> Height {
        self.max_height
    }

    /// Output extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Default for TransformationParams {
    fn default() -> Self {
        Self {
            max_width: MAX_DIMENSION,
            max_height: MAX_DIMENSION,
            extension: "png".to_owned(),
        }
    }
}

/// Signed URL.
#[derive(Debug)]
pub struct SignedUrl {
    base: Url,
    secret: Secret,
    params: TransformationParams,
    target: Url,
}

impl SignedUrl {
    const fn new(secret: Secret, base: Url, target: Url, params: TransformationParams) -> Self {
        Self {
            base,
            secret,
            params,
            target,
        }
    }

    /// Returns the transform parameters being signed.
    pub fn params(&self) -> &TransformationParams {
        &self.params
    }

    /// Returns the signed request parameters for the target.
    pub fn request_params(&self) -> ThumbnailRequestParams {
        let params = &self.params;
        let url_encoded = codec::encode(self.target.as_str());

        let unsigned = ThumbnailRequestParams::new(
            url_encoded.as_str(),
            params.max_width,
            params.max_height,
            params.extension.as_str(),
            "",
        );
        let signature = sign(&CanonicalPayload::from_params(&unsigned), &self.secret);

        ThumbnailRequestParams::new(
            url_encoded,
            params.max_width,
            params.max_height,
            params.extension.as_str(),
            signature,
        )
    }

    /// Generates a signed URL under the base URL.
    ///
    /// The path appended to the base has the form
    /// `{url_encoded}/{max_width}/{max_height}/{signature}.{extension}`.
    pub fn generate_signed_url(&self) -> Result<Url, url::ParseError> {
        self.base.join(&self.request_params().to_string())
    }
}

/// Builder for [`SignedUrl`].
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::{Secret, SignedUrlBuilder, Validator};
/// use url::Url;
///
/// let secret = Secret::from("shared secret");
///
/// let base: Url = "https://thumbs.example.com/t/".parse()?;
/// let target: Url = "https://www.example.com/cat.png".parse()?;
/// let signed = SignedUrlBuilder::new()
///     .secret(secret.clone())
///     .base(base)
///     .params()
///     .max_width(150)
///     .max_height(100)
///     .extension("gif")
///     .target(target)
///     .build();
///
/// let url = signed.generate_signed_url()?;
/// assert!(url.path().starts_with("/t/"));
/// assert!(url.path().ends_with(".gif"));
///
/// assert!(Validator::new(secret).validity(&signed.request_params()));
/// # Ok::<(), url::ParseError>(())
/// ```
#[derive(Debug)]
pub struct SignedUrlBuilder<S, B, P, T> {
    secret: S,
    base: B,
    params: P,
    target: T,
}

impl SignedUrlBuilder<(), (), (), ()> {
    /// Create a new [`SignedUrlBuilder`].
    pub const fn new() -> Self {
        Self {
            secret: (),
            base: (),
            params: (),
            target: (),
        }
    }

    /// Set signing secret.
    pub fn secret(self, secret: Secret) -> SignedUrlBuilder<Secret, (), (), ()> {
        SignedUrlBuilder {
            secret,
            base: (),
            params: (),
            target: (),
        }
    }
}

impl SignedUrlBuilder<Secret, (), (), ()> {
    /// Set base URL.
    pub fn base(self, base: Url) -> SignedUrlBuilder<Secret, Url, (), ()> {
        SignedUrlBuilder {
            secret: self.secret,
            base,
            params: (),
            target: (),
        }
    }
}

impl SignedUrlBuilder<Secret, Url, (), ()> {
    /// Returns a builder on which parameters may be set.
    pub fn params(self) -> SignedUrlBuilder<Secret, Url, TransformationParams, ()> {
        SignedUrlBuilder {
            secret: self.secret,
            base: self.base,
            params: TransformationParams::default(),
            target: (),
        }
    }
}

impl SignedUrlBuilder<Secret, Url, TransformationParams, ()> {
    /// Set maximum width.
    pub fn max_width(mut self, max_width: Width) -> Self {
        self.params.max_width = max_width;
        self
    }

    /// Set maximum height.
    pub fn max_height(mut self, max_height: Height) -> Self {
        self.params.max_height = max_height;
        self
    }

    /// Set output extension.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.params.extension = extension.into();
        self
    }

    /// Set image target URL.
    pub fn target(self, target: Url) -> SignedUrlBuilder<Secret, Url, TransformationParams, Url> {
        SignedUrlBuilder {
            secret: self.secret,
            base: self.base,
            params: self.params,
            target,
        }
    }
}

impl SignedUrlBuilder<Secret, Url, TransformationParams, Url> {
    /// Returns a [`SignedUrl`].
    pub fn build(self) -> SignedUrl {
        SignedUrl::new(self.secret, self.base, self.target, self.params)
    }
}

impl Default for SignedUrlBuilder<(), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::policy::DEFAULT_SUPPORTED_EXTENSIONS;

    const URL: &str = "http://www.example.com";

    fn signed(secret: &Secret) -> ThumbnailRequestParams {
        let url_encoded = codec::encode(URL);
        let unsigned = ThumbnailRequestParams::new(url_encoded.as_str(), 600, 600, "gif", "");
        let signature = sign(&CanonicalPayload::from_params(&unsigned), secret);
        ThumbnailRequestParams::new(url_encoded, 600, 600, "gif", signature)
    }

    fn with_signature(params: &ThumbnailRequestParams, signature: String) -> ThumbnailRequestParams {
        ThumbnailRequestParams::new(
            params.url_encoded(),
            params.max_width(),
            params.max_height(),
            params.extension(),
            signature,
        )
    }

    #[test]
    fn payload_excludes_signature() {
        let a = ThumbnailRequestParams::new("dXJs", 3, 4, "png", "one");
        let b = ThumbnailRequestParams::new("dXJs", 3, 4, "png", "two");
        assert_eq!(CanonicalPayload::from_params(&a), CanonicalPayload::from_params(&b));
    }

    #[test]
    fn sign_is_deterministic() {
        let secret = Secret::from("secret");
        let payload = CanonicalPayload::from_params(&signed(&secret));

        let signature = sign(&payload, &secret);
        assert_eq!(signature, sign(&payload, &secret));
        // 32 byte digest, unpadded.
        assert_eq!(signature.len(), 43);
        assert!(!signature.contains(['+', '/', '=']));
    }

    #[test]
    fn known_signature() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let payload = CanonicalPayload("The quick brown fox jumps over the lazy dog".to_owned());
        assert_eq!(
            sign(&payload, &Secret::from("key")),
            "97yD9DBThCSxMpjmqm-xQ-9NWaFJRhdZl0edvC0aPNg"
        );
    }

    #[test]
    fn verifies_own_signature() {
        let secret = Secret::from("secret");
        let params = signed(&secret);

        assert!(validate_signature_base64(&params, &secret));
        assert!(Verifier::new(secret).verify(&params));
    }

    #[test]
    fn rejects_other_secret() {
        let params = signed(&Secret::from("secret"));
        assert!(!validate_signature_base64(&params, &Secret::from("secreT")));
    }

    #[test]
    fn rejects_tampered_fields() {
        let secret = Secret::from("secret");
        let params = signed(&secret);
        let signature = params.signature_encoded();

        let tampered = [
            ThumbnailRequestParams::new(codec::encode("http://www.example.org"), 600, 600, "gif", signature),
            ThumbnailRequestParams::new(params.url_encoded(), 601, 600, "gif", signature),
            ThumbnailRequestParams::new(params.url_encoded(), 600, 599, "gif", signature),
            ThumbnailRequestParams::new(params.url_encoded(), 600, 600, "png", signature),
        ];

        for params in &tampered {
            assert!(!validate_signature_base64(params, &secret), "{params:?}");
        }
    }

    #[test]
    fn rejects_tampered_signatures() {
        let secret = Secret::from("secret");
        let params = signed(&secret);
        let signature = params.signature_encoded();

        for i in 0..signature.len() {
            let mut bytes = signature.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let flipped = String::from_utf8(bytes).unwrap();
            assert!(!validate_signature_base64(&with_signature(&params, flipped), &secret));
        }

        let malformed = [
            String::new(),
            "not base64!".to_owned(),
            signature[1..].to_owned(),
            format!("{signature}="),
        ];
        for bad in malformed {
            assert!(!validate_signature_base64(&with_signature(&params, bad), &secret));
        }
    }

    #[test]
    fn rejects_fields_shifted_across_separator() {
        let secret = Secret::from("secret");
        let signature = sign(
            &CanonicalPayload::from_params(&ThumbnailRequestParams::new("YQ", 3, 4, "5/png", "")),
            &secret,
        );

        let shifted = ThumbnailRequestParams::new("YQ/3", 4, 5, "png", signature.as_str());
        assert_eq!(
            CanonicalPayload::from_params(&shifted),
            CanonicalPayload::from_params(&ThumbnailRequestParams::new("YQ", 3, 4, "5/png", ""))
        );
        assert!(!validate_signature_base64(&shifted, &secret));

        let original = ThumbnailRequestParams::new("YQ", 3, 4, "5/png", signature);
        assert!(!validate_signature_base64(&original, &secret));
        assert!(!Verifier::new(secret).verify(&original));
    }

    #[test]
    fn signed_url_round_trips_through_path() {
        let secret = Secret::from("secret");
        let signed = SignedUrlBuilder::new()
            .secret(secret.clone())
            .base("http://localhost:3000/_thumb/".parse().unwrap())
            .params()
            .max_width(150)
            .max_height(100)
            .extension("jpeg")
            .target("https://www.example.com/a.png".parse().unwrap())
            .build();

        let url = signed.generate_signed_url().unwrap();
        let path = url.path().strip_prefix("/_thumb/").unwrap();
        let params: ThumbnailRequestParams = path.parse().unwrap();

        assert_eq!(params, signed.request_params());
        assert_eq!(signed.params().max_width(), 150);
        assert_eq!(signed.params().max_height(), 100);
        assert_eq!(signed.params().extension(), "jpeg");
        assert_eq!(params.max_width(), 150);
        assert_eq!(params.max_height(), 100);
        assert_eq!(params.extension(), "jpeg");
        assert_eq!(codec::decode(params.url_encoded()).unwrap(), "https://www.example.com/a.png");
        assert!(validate_signature_base64(&params, &secret));
    }

    const URL_SAFE_ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    // HMAC zero-pads short keys, so keys differing only in trailing zero
    // bytes are equivalent. Nonzero bytes keep distinct secrets distinct.
    fn secret_strategy() -> impl Strategy<Value = Secret> {
        prop::collection::vec(1u8..=255, 1..64).prop_map(|bytes| Secret::from(bytes))
    }

    fn url_strategy() -> impl Strategy<Value = String> {
        "https?://[a-z]{1,12}\\.(com|org|net)(/[a-z0-9]{0,8})?"
    }

    fn extension_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(DEFAULT_SUPPORTED_EXTENSIONS)
    }

    fn signed_request(
        secret: &Secret,
        url: &str,
        max_width: u32,
        max_height: u32,
        extension: &str,
    ) -> ThumbnailRequestParams {
        let url_encoded = codec::encode(url);
        let unsigned =
            ThumbnailRequestParams::new(url_encoded.as_str(), max_width, max_height, extension, "");
        let signature = sign(&CanonicalPayload::from_params(&unsigned), secret);
        ThumbnailRequestParams::new(url_encoded, max_width, max_height, extension, signature)
    }

    proptest! {
        #[test]
        fn changed_url_invalidates_signature(
            secret in secret_strategy(),
            url in url_strategy(),
            other in url_strategy(),
            max_width in 3u32..=1024,
            max_height in 3u32..=1024,
            extension in extension_strategy(),
        ) {
            prop_assume!(url != other);
            let params = signed_request(&secret, &url, max_width, max_height, extension);
            prop_assert!(validate_signature_base64(&params, &secret));

            let tampered = ThumbnailRequestParams::new(
                codec::encode(&other),
                max_width,
                max_height,
                extension,
                params.signature_encoded(),
            );
            prop_assert!(!validate_signature_base64(&tampered, &secret));
        }

        #[test]
        fn changed_dimensions_invalidate_signature(
            secret in secret_strategy(),
            url in url_strategy(),
            max_width in 3u32..=1024,
            max_height in 3u32..=1024,
            other in any::<u32>(),
            extension in extension_strategy(),
        ) {
            let params = signed_request(&secret, &url, max_width, max_height, extension);
            let url_encoded = params.url_encoded();
            let signature = params.signature_encoded();

            if other != max_width {
                let tampered =
                    ThumbnailRequestParams::new(url_encoded, other, max_height, extension, signature);
                prop_assert!(!validate_signature_base64(&tampered, &secret));
            }

            if other != max_height {
                let tampered =
                    ThumbnailRequestParams::new(url_encoded, max_width, other, extension, signature);
                prop_assert!(!validate_signature_base64(&tampered, &secret));
            }
        }

        #[test]
        fn changed_extension_invalidates_signature(
            secret in secret_strategy(),
            url in url_strategy(),
            max_width in 3u32..=1024,
            max_height in 3u32..=1024,
            extension in extension_strategy(),
            other in "[a-z]{0,6}",
        ) {
            prop_assume!(extension != other);
            let params = signed_request(&secret, &url, max_width, max_height, extension);

            let tampered = ThumbnailRequestParams::new(
                params.url_encoded(),
                max_width,
                max_height,
                other,
                params.signature_encoded(),
            );
            prop_assert!(!validate_signature_base64(&tampered, &secret));
        }

        #[test]
        fn changed_signature_byte_invalidates_signature(
            secret in secret_strategy(),
            url in url_strategy(),
            max_width in 3u32..=1024,
            max_height in 3u32..=1024,
            extension in extension_strategy(),
            index in 0usize..43,
            replacement in prop::sample::select(URL_SAFE_ALPHABET),
        ) {
            let params = signed_request(&secret, &url, max_width, max_height, extension);
            let mut signature = params.signature_encoded().as_bytes().to_vec();
            prop_assume!(signature[index] != replacement);
            signature[index] = replacement;

            let tampered = with_signature(&params, String::from_utf8(signature).unwrap());
            prop_assert!(!validate_signature_base64(&tampered, &secret));
        }

        #[test]
        fn other_secret_invalidates_signature(
            secret in secret_strategy(),
            other in secret_strategy(),
            url in url_strategy(),
            extension in extension_strategy(),
        ) {
            prop_assume!(secret != other);
            let params = signed_request(&secret, &url, 600, 600, extension);
            prop_assert!(!validate_signature_base64(&params, &other));
        }
    }
}

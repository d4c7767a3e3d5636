use url::Url;

use crate::{
    codec,
    params::ThumbnailRequestParams,
    policy::Policy,
    signed::Verifier,
    Secret,
};

/// Returns `true` if `params` is well-formed, within the default policy and
/// signed with `secret`.
///
/// Checks run in order and stop at the first failure: target URL, dimensions,
/// extension, then signature.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::{codec, sign, validity, CanonicalPayload, Secret, ThumbnailRequestParams};
///
/// let secret = Secret::from("shared secret");
/// let url = codec::encode("http://www.example.com");
///
/// let unsigned = ThumbnailRequestParams::new(url.as_str(), 600, 600, "gif", "");
/// let signature = sign(&CanonicalPayload::from_params(&unsigned), &secret);
/// let params = ThumbnailRequestParams::new(url.as_str(), 600, 600, "gif", signature.as_str());
/// assert!(validity(&params, &secret));
///
/// let params = ThumbnailRequestParams::new(url.as_str(), 600, 600, "wav", signature.as_str());
/// assert!(!validity(&params, &secret));
/// ```
pub fn validity(params: &ThumbnailRequestParams, secret: &Secret) -> bool {
    check(params, &Policy::DEFAULT, |params| {
        crate::validate_signature_base64(params, secret)
    })
    .is_some()
}

/// Validator of thumbnail requests.
#[derive(Debug, Clone)]
pub struct Validator {
    verifier: Verifier,
    policy: Policy,
}

impl Validator {
    /// Create a new [`Validator`] with the provided [`Secret`] and the default
    /// [`Policy`].
    pub fn new(secret: Secret) -> Self {
        Self {
            verifier: Verifier::new(secret),
            policy: Policy::default(),
        }
    }

    /// Configure the policy.
    pub fn with_policy(self, policy: Policy) -> Self {
        Self { policy, ..self }
    }

    /// Returns `true` if `params` passes every check. See [`validity`].
    pub fn validity(&self, params: &ThumbnailRequestParams) -> bool {
        self.validated_target(params).is_some()
    }

    /// Returns the decoded target URL if, and only if, `params` passes every
    /// check.
    ///
    /// The URL is returned parsed, so it is in its normalized form and may
    /// differ textually from the decoded string: `http://www.example.com`
    /// comes back as `http://www.example.com/`. Use [`codec::decode`] for the
    /// exact string that was signed.
    pub fn validated_target(&self, params: &ThumbnailRequestParams) -> Option<Url> {
        check(params, &self.policy, |params| self.verifier.verify(params))
    }
}

fn check(
    params: &ThumbnailRequestParams,
    policy: &Policy,
    verify: impl FnOnce(&ThumbnailRequestParams) -> bool,
) -> Option<Url> {
    let target = match codec::decode(params.url_encoded()) {
        Ok(decoded) => codec::parse_target(&decoded),
        Err(err) => {
            tracing::debug!(err = %err, "could not decode target URL");
            return None;
        }
    };
    let Some(target) = target else {
        tracing::debug!("invalid target URL");
        return None;
    };

    if !policy.allows_dimension(params.max_width()) || !policy.allows_dimension(params.max_height())
    {
        tracing::debug!(
            max_width = params.max_width(),
            max_height = params.max_height(),
            "dimensions out of bounds"
        );
        return None;
    }

    if !policy.allows_extension(params.extension()) {
        tracing::debug!(extension = params.extension(), "unsupported extension");
        return None;
    }

    if !verify(params) {
        return None;
    }

    Some(target)
}

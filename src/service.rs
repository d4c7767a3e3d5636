use std::task::{Context, Poll};

use futures_util::future::{self, Either, Ready};
use http::{Request, Response, StatusCode};
use tower_layer::Layer;
use tower_service::Service;
use url::Url;

use crate::{
    params::{Height, ThumbnailRequestParams, Width},
    policy::{Policy, SupportedExtensions},
    validator::Validator,
    Secret,
};

/// A thumbnail request that passed validation.
///
/// Inserted into the request extensions before the inner service is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedThumbnail {
    /// Decoded target image URL, parsed and therefore normalized (for
    /// example, an empty path becomes `/`).
    pub target: Url,

    /// Requested maximum width.
    pub max_width: Width,

    /// Requested maximum height.
    pub max_height: Height,

    /// Requested output extension.
    pub extension: String,
}

/// Middleware which rejects thumbnail requests that are malformed, outside
/// policy, or not signed with the shared secret.
#[derive(Debug, Clone)]
pub struct ThumbnailValidator<S> {
    inner: S,
    validator: Validator,
}

/// [`Layer`] producing [`ThumbnailValidator`].
#[derive(Debug, Clone)]
pub struct ThumbnailValidatorLayer {
    validator: Validator,
}

impl<S> Layer<S> for ThumbnailValidatorLayer {
    type Service = ThumbnailValidator<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ThumbnailValidator {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Builder for [`ThumbnailValidatorLayer`].
#[derive(Debug)]
pub struct ThumbnailValidatorBuilder {
    secret: Secret,
    policy: Policy,
}

impl ThumbnailValidatorBuilder {
    /// Create a new [`ThumbnailValidatorBuilder`] with the provided [`Secret`].
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            policy: Policy::default(),
        }
    }

    /// Configure supported output extensions.
    pub fn set_supported_extensions(self, supported_extensions: SupportedExtensions) -> Self {
        Self {
            policy: self.policy.with_supported_extensions(supported_extensions),
            ..self
        }
    }

    /// Build the [`ThumbnailValidatorLayer`].
    pub fn build(self) -> ThumbnailValidatorLayer {
        ThumbnailValidatorLayer {
            validator: Validator::new(self.secret).with_policy(self.policy),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ThumbnailValidator<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Either<Ready<Result<Self::Response, Self::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Expected path, relative to where the middleware is mounted:
        //
        //   /{url_encoded}/{max_width}/{max_height}/{signature_encoded}.{extension}
        let params = match req.uri().path().parse::<ThumbnailRequestParams>() {
            Ok(params) => params,
            Err(err) => {
                tracing::warn!(uri = %req.uri(), err = %err, "invalid path");
                return Either::Left(future::ready(Ok(response_with_status(
                    StatusCode::BAD_REQUEST,
                ))));
            }
        };

        let Some(target) = self.validator.validated_target(&params) else {
            tracing::warn!(uri = %req.uri(), "rejected thumbnail request");
            return Either::Left(future::ready(Ok(response_with_status(
                StatusCode::BAD_REQUEST,
            ))));
        };

        req.extensions_mut().insert(ValidatedThumbnail {
            target,
            max_width: params.max_width(),
            max_height: params.max_height(),
            extension: params.extension().to_owned(),
        });

        Either::Right(self.inner.call(req))
    }
}

fn response_with_status<B>(status_code: StatusCode) -> Response<B>
where
    B: Default,
{
    let mut res = Response::default();
    *res.status_mut() = status_code;
    res
}

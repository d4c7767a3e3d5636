//! # Overview
//!
//! This crate validates signed thumbnail requests: a target image URL plus a
//! maximum width, maximum height and output extension, signed with a shared
//! secret. It answers one question per request, valid or not, and hands back
//! the decoded target URL only for valid requests. Fetching and resizing the
//! image is left to the host.
//!
//! A request is valid when, in this order:
//!
//! 1. the URL-safe Base64 target decodes to an absolute `http`/`https` URL,
//! 2. both dimensions are within 3 and 1024, inclusive,
//! 3. the extension is one of `jpeg`, `png`, `gif`, `ico` or `webm`,
//! 4. the signature is the HMAC-SHA256 of the [`CanonicalPayload`] under the
//!    shared secret.
//!
//! # Usage with an `axum` application
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//!
//! use axum::{extract::Extension, routing::get, Router};
//! use thumbnail_signature::{Secret, SignedUrlBuilder, ThumbnailValidatorBuilder, ValidatedThumbnail};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secret = Secret::generate();
//!
//!     // URL construction, on the signer side.
//!     let signed_url = SignedUrlBuilder::new()
//!         .secret(secret.clone())
//!         .base("http://localhost:3000/_thumb/".parse()?)
//!         .params()
//!         .max_width(150)
//!         .max_height(100)
//!         .extension("png")
//!         .target("https://www.rustacean.net/assets/rustacean-orig-noshadow.png".parse()?)
//!         .build()
//!         .generate_signed_url()?;
//!     println!("{signed_url}");
//!
//!     // Only validated requests reach the handler.
//!     let thumbnails = Router::new()
//!         .route(
//!             "/*path",
//!             get(|Extension(thumb): Extension<ValidatedThumbnail>| async move {
//!                 format!("{} at most {}x{}", thumb.target, thumb.max_width, thumb.max_height)
//!             }),
//!         )
//!         .layer(ThumbnailValidatorBuilder::new(secret).build());
//!     let app = Router::new().nest("/_thumb", thumbnails);
//!
//!     let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
//!     let listener = tokio::net::TcpListener::bind(&addr).await?;
//!     axum::serve(listener, app.into_make_service()).await?;
//!
//!     Ok(())
//! }
//! ```
#![warn(
    clippy::all,
    nonstandard_style,
    future_incompatible,
    missing_docs,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

pub mod codec;
mod params;
pub mod policy;
mod secret;
mod service;
pub mod settings;
mod signed;
mod validator;

pub use params::{Height, ParamsError, ThumbnailRequestParams, Width};
pub use secret::{Secret, SecretError};
pub use service::{
    ThumbnailValidator, ThumbnailValidatorBuilder, ThumbnailValidatorLayer, ValidatedThumbnail,
};
pub use signed::{
    sign, validate_signature_base64, CanonicalPayload, SignedUrl, SignedUrlBuilder,
    TransformationParams, Verifier,
};
pub use validator::{validity, Validator};

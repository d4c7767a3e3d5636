use std::str::FromStr;

/// Requested maximum width in pixels.
pub type Width = u32;
/// Requested maximum height in pixels.
pub type Height = u32;

/// Error returned when a request path cannot be split into parameters.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    /// The path did not have exactly four segments.
    #[error("expected 4 path segments, got {0}")]
    SegmentCount(usize),

    /// The final segment had no `.{extension}` suffix.
    #[error("missing extension")]
    MissingExtension,

    /// A dimension segment was not an unsigned integer.
    #[error("invalid {0} dimension")]
    InvalidDimension(&'static str),
}

/// Parameters of one inbound thumbnail request.
///
/// The path form of a request is:
///
/// ```text
/// {url_encoded}/{max_width}/{max_height}/{signature_encoded}.{extension}
/// ```
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::ThumbnailRequestParams;
///
/// let params: ThumbnailRequestParams = "/aHR0cDovL3d3dy5leGFtcGxlLmNvbQ/600/400/c2ln.gif".parse()?;
///
/// assert_eq!(params.url_encoded(), "aHR0cDovL3d3dy5leGFtcGxlLmNvbQ");
/// assert_eq!(params.max_width(), 600);
/// assert_eq!(params.max_height(), 400);
/// assert_eq!(params.signature_encoded(), "c2ln");
/// assert_eq!(params.extension(), "gif");
/// # Ok::<(), thumbnail_signature::ParamsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequestParams {
    url_encoded: String,
    max_width: Width,
    max_height: Height,
    extension: String,
    signature_encoded: String,
}

impl ThumbnailRequestParams {
    /// Create parameters from their individual fields.
    pub fn new(
        url_encoded: impl Into<String>,
        max_width: Width,
        max_height: Height,
        extension: impl Into<String>,
        signature_encoded: impl Into<String>,
    ) -> Self {
        Self {
            url_encoded: url_encoded.into(),
            max_width,
            max_height,
            extension: extension.into(),
            signature_encoded: signature_encoded.into(),
        }
    }

    /// Encoded target URL.
    pub fn url_encoded(&self) -> &str {
        &self.url_encoded
    }

    /// Requested maximum width.
    pub fn max_width(&self) -> Width {
        self.max_width
    }

    /// Requested maximum height.
    pub fn max_height(&self) -> Height {
        self.max_height
    }

    /// Requested output extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Caller-supplied signature.
    pub fn signature_encoded(&self) -> &str {
        &self.signature_encoded
    }
}

impl FromStr for ThumbnailRequestParams {
    type Err = ParamsError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let [url_encoded, max_width, max_height, last] = segments[..] else {
            return Err(ParamsError::SegmentCount(segments.len()));
        };

        let Some((signature_encoded, extension)) = last.rsplit_once('.') else {
            return Err(ParamsError::MissingExtension);
        };

        let max_width = max_width
            .parse()
            .map_err(|_| ParamsError::InvalidDimension("width"))?;
        let max_height = max_height
            .parse()
            .map_err(|_| ParamsError::InvalidDimension("height"))?;

        Ok(Self::new(
            url_encoded,
            max_width,
            max_height,
            extension,
            signature_encoded,
        ))
    }
}

impl std::fmt::Display for ThumbnailRequestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}.{}",
            self.url_encoded, self.max_width, self.max_height, self.signature_encoded, self.extension
        )
    }
}

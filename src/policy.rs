//! Policy limits on requested thumbnails: dimension bounds and the output
//! extension allow-list.

/// Smallest accepted width or height, inclusive.
pub const MIN_DIMENSION: u32 = 3;

/// Largest accepted width or height, inclusive.
pub const MAX_DIMENSION: u32 = 1024;

/// Alias for a static slice of supported output extensions.
pub type SupportedExtensions = &'static [&'static str];

/// Default output extensions.
pub const DEFAULT_SUPPORTED_EXTENSIONS: SupportedExtensions =
    &["jpeg", "png", "gif", "ico", "webm"];

mod sealed {
    pub trait Sealed {}
}

/// Integer types accepted as a width or height.
///
/// Sealed: implemented for the primitive integer types only, so `char`,
/// `bool`, floats and strings do not type-check.
pub trait Dimension: sealed::Sealed + Copy {
    /// Returns the value as a `u32`, or `None` if it is negative or too large.
    fn to_u32(self) -> Option<u32>;
}

macro_rules! impl_dimension {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Dimension for $ty {
                fn to_u32(self) -> Option<u32> {
                    u32::try_from(self).ok()
                }
            }
        )*
    };
}

impl_dimension!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Bounds and allow-list applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    min_dimension: u32,
    max_dimension: u32,
    supported_extensions: SupportedExtensions,
}

impl Policy {
    /// Policy used by [`validate_max_width_height`] and [`validate_extension`].
    pub const DEFAULT: Policy = Policy {
        min_dimension: MIN_DIMENSION,
        max_dimension: MAX_DIMENSION,
        supported_extensions: DEFAULT_SUPPORTED_EXTENSIONS,
    };

    /// Replace the extension allow-list.
    pub const fn with_supported_extensions(self, supported_extensions: SupportedExtensions) -> Self {
        Self {
            supported_extensions,
            ..self
        }
    }

    /// Returns the extension allow-list.
    pub const fn supported_extensions(&self) -> SupportedExtensions {
        self.supported_extensions
    }

    /// Returns `true` if `value` is an integer within the dimension bounds.
    pub fn allows_dimension<T: Dimension>(&self, value: T) -> bool {
        value
            .to_u32()
            .is_some_and(|value| (self.min_dimension..=self.max_dimension).contains(&value))
    }

    /// Returns `true` if `value` is in the allow-list. Matching is
    /// case-sensitive.
    pub fn allows_extension(&self, value: &str) -> bool {
        self.supported_extensions.contains(&value)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Returns `true` if `value` is within [`MIN_DIMENSION`] and
/// [`MAX_DIMENSION`], inclusive.
///
/// Only integer types are accepted; numeric-looking strings are a type error
/// rather than something to coerce.
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::policy::validate_max_width_height;
///
/// assert!(validate_max_width_height(400));
/// assert!(validate_max_width_height(3u16));
/// assert!(validate_max_width_height(1024u64));
/// assert!(!validate_max_width_height(1));
/// assert!(!validate_max_width_height(5000));
/// assert!(!validate_max_width_height(-400i64));
/// ```
///
/// ```rust,compile_fail
/// use thumbnail_signature::policy::validate_max_width_height;
///
/// validate_max_width_height("5000");
/// ```
///
/// ```rust,compile_fail
/// use thumbnail_signature::policy::validate_max_width_height;
///
/// validate_max_width_height('d');
/// ```
///
/// ```rust,compile_fail
/// use thumbnail_signature::policy::validate_max_width_height;
///
/// validate_max_width_height(true);
/// ```
///
/// ```rust,compile_fail
/// use thumbnail_signature::policy::validate_max_width_height;
///
/// validate_max_width_height(400.0);
/// ```
pub fn validate_max_width_height<T: Dimension>(value: T) -> bool {
    Policy::DEFAULT.allows_dimension(value)
}

/// Returns `true` if `value` is one of [`DEFAULT_SUPPORTED_EXTENSIONS`].
///
/// # Example
///
/// ```rust
/// use thumbnail_signature::policy::validate_extension;
///
/// assert!(validate_extension("gif"));
/// assert!(!validate_extension("wav"));
/// ```
pub fn validate_extension(value: &str) -> bool {
    Policy::DEFAULT.allows_extension(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_bounds_are_inclusive() {
        assert!(validate_max_width_height(400));
        assert!(validate_max_width_height(3));
        assert!(validate_max_width_height(1024));

        assert!(!validate_max_width_height(1));
        assert!(!validate_max_width_height(2));
        assert!(!validate_max_width_height(1025));
        assert!(!validate_max_width_height(5000));
        assert!(!validate_max_width_height(0));
    }

    #[test]
    fn dimension_rejects_out_of_range_integer_types() {
        assert!(!validate_max_width_height(-3i32));
        assert!(!validate_max_width_height(i64::MAX));
        assert!(!validate_max_width_height(u64::MAX));
        assert!(validate_max_width_height(600usize));
    }

    #[test]
    fn dimension_conversion_per_integer_type() {
        assert_eq!(255u8.to_u32(), Some(255));
        assert_eq!((-1i8).to_u32(), None);
        assert_eq!(1024i16.to_u32(), Some(1024));
        assert_eq!(u64::from(u32::MAX).to_u32(), Some(u32::MAX));
        assert_eq!((u64::from(u32::MAX) + 1).to_u32(), None);
        assert_eq!(isize::MIN.to_u32(), None);
    }

    #[test]
    fn extension_allow_list() {
        for ext in ["jpeg", "png", "gif", "ico", "webm"] {
            assert!(validate_extension(ext), "{ext} should be allowed");
        }

        for ext in ["wav", "JPEG", "Png", "jpg", "", "gif ", "svg"] {
            assert!(!validate_extension(ext), "{ext:?} should be rejected");
        }
    }

    #[test]
    fn narrowed_allow_list() {
        let policy = Policy::default().with_supported_extensions(&["png"]);

        assert!(policy.allows_extension("png"));
        assert!(!policy.allows_extension("gif"));
        assert!(policy.allows_dimension(600));
    }
}

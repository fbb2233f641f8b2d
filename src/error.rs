//! Error types shared by the geometry and raster layers.

use thiserror::Error;

/// Result type for fallible geometry and imaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by this crate.
///
/// Every failure is local and deterministic: the same inputs always produce
/// the same error, and no operation leaves partially written state behind
/// except where documented (e.g. a raster write that fails halfway through a
/// rectangle).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A constructor or setter was handed a value that violates an invariant.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The transform has a zero (or vanishingly small) determinant.
    #[error("non-invertible transform: {0}")]
    NoninvertibleTransform(String),

    /// The operation is not supported by this model configuration.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A path iterator was read or advanced past its last segment.
    #[error("no such element: {0}")]
    NoSuchElement(String),

    /// A coordinate, band, bank or element index is out of range.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),

    /// A raster layout is inconsistent with its parent or its data buffer.
    #[error("raster format error: {0}")]
    RasterFormat(String),

    /// A path segment was appended in a state that cannot accept it.
    #[error("illegal path state: {0}")]
    IllegalPathState(String),
}

impl Error {
    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Error::IllegalArgument(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedOperation(msg.into())
    }

    pub(crate) fn out_of_bounds(msg: impl Into<String>) -> Self {
        Error::IndexOutOfBounds(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::NoninvertibleTransform("determinant is 0".into());
        assert_eq!(e.to_string(), "non-invertible transform: determinant is 0");

        let e = Error::illegal("width must be > 0");
        assert_eq!(e.to_string(), "illegal argument: width must be > 0");

        let e = Error::NoSuchElement("rect iterator out of bounds".into());
        assert!(e.to_string().starts_with("no such element"));
    }

    #[test]
    fn test_helpers_pick_variants() {
        assert!(matches!(Error::unsupported("x"), Error::UnsupportedOperation(_)));
        assert!(matches!(Error::out_of_bounds("x"), Error::IndexOutOfBounds(_)));
    }
}

//! Error types shared by all kernels.
//!
//! Validation happens once, at the start of a call. Numeric edge cases inside
//! the per-pixel loops (division in dodge/burn, zero variance) are resolved to
//! their limiting values and never show up here.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// The two fatal error categories a kernel call can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Zero-sized images, mismatched base/layer shapes, wrong buffer lengths.
    InvalidDimension,
    /// Out-of-range numeric parameters and unknown selectors.
    InvalidParameter,
}

/// Kernel errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    #[error(
        "dimension mismatch: expected {expected_width}x{expected_height}x{expected_channels}, got {width}x{height}x{channels}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        expected_channels: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unknown {kind} `{value}`")]
    UnknownSelector { kind: &'static str, value: String },
}

impl Error {
    /// Which fatal category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidDimension { .. }
            | Error::DimensionMismatch { .. }
            | Error::BufferLength { .. } => ErrorKind::InvalidDimension,
            Error::InvalidParameter { .. } | Error::UnknownSelector { .. } => {
                ErrorKind::InvalidParameter
            }
        }
    }

    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails unless `value` lies in `min..=max` and is finite.
pub(crate) fn check_range(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::parameter(
            name,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            Error::InvalidDimension {
                width: 0,
                height: 3
            }
            .kind(),
            ErrorKind::InvalidDimension
        );
        assert_eq!(
            Error::UnknownSelector {
                kind: "blend mode",
                value: "glow".into()
            }
            .kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn range_check_rejects_nan() {
        assert!(check_range("opacity", f32::NAN, 0.0, 1.0).is_err());
        assert!(check_range("opacity", 1.0, 0.0, 1.0).is_ok());
        assert!(check_range("opacity", 1.01, 0.0, 1.0).is_err());
    }
}

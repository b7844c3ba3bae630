//! Error types for vfx-core lookups.
//!
//! # Overview
//!
//! The [`Error`] enum covers name parsing for the lookup tables:
//! - Parsing an unknown palette name
//! - Parsing an unknown gamma name
//!
//! # Usage
//!
//! ```rust
//! use vfx_core::{Error, Palette};
//!
//! let err = "rgb48".parse::<Palette>().unwrap_err();
//! assert!(matches!(err, Error::UnknownPalette { .. }));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from vfx-core lookups.
#[derive(Debug, Error)]
pub enum Error {
    /// Palette name not recognised.
    #[error("unknown palette: {name}")]
    UnknownPalette {
        /// Name that failed to parse
        name: String,
    },

    /// Gamma name not recognised.
    #[error("unknown gamma: {name}")]
    UnknownGamma {
        /// Name that failed to parse
        name: String,
    },
}

impl Error {
    /// Creates an [`Error::UnknownPalette`] error.
    #[inline]
    pub fn unknown_palette(name: impl Into<String>) -> Self {
        Self::UnknownPalette { name: name.into() }
    }

    /// Creates an [`Error::UnknownGamma`] error.
    #[inline]
    pub fn unknown_gamma(name: impl Into<String>) -> Self {
        Self::UnknownGamma { name: name.into() }
    }

    /// Returns `true` if a name failed to parse.
    #[inline]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::UnknownPalette { .. } | Self::UnknownGamma { .. })
    }
}

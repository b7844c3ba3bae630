//! Gamma-curve tags.
//!
//! A [`Gamma`] records which tone-response curve the pixel values of a frame
//! are encoded with. Only the tag lives here; applying a curve is the
//! converter's job.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Tone-response curve associated with pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gamma {
    /// Not yet known.
    #[default]
    Unknown,
    /// Linear light.
    Linear,
    /// sRGB piecewise curve.
    Srgb,
    /// ITU-R BT.709 OETF.
    Bt709,
}

impl Gamma {
    /// Whether values are linear light.
    #[inline]
    pub const fn is_linear(&self) -> bool {
        matches!(self, Self::Linear)
    }

    /// Short name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Linear => "linear",
            Self::Srgb => "srgb",
            Self::Bt709 => "bt709",
        }
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gamma {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "linear" | "lin" => Ok(Self::Linear),
            "srgb" => Ok(Self::Srgb),
            "bt709" | "rec709" => Ok(Self::Bt709),
            _ => Err(Error::unknown_gamma(s)),
        }
    }
}

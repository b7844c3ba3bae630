//! YUV colour-encoding metadata.
//!
//! These tags travel with a YUV frame and tell the converter how luma and
//! chroma values were scaled ([`YuvClamping`]), where chroma samples sit
//! relative to luma ([`YuvSampling`]), and which matrix/primaries apply
//! ([`YuvSubspace`]). They are meaningless for RGB palettes.

use std::fmt;

/// Range of luma/chroma values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YuvClamping {
    /// Studio range: luma 16..=235, chroma 16..=240.
    #[default]
    Clamped,
    /// Full range: 0..=255.
    Unclamped,
}

impl YuvClamping {
    /// Luma code value for black.
    #[inline]
    pub const fn black_luma(&self) -> u8 {
        match self {
            Self::Clamped => 16,
            Self::Unclamped => 0,
        }
    }

    /// Chroma code value for zero colour difference.
    #[inline]
    pub const fn neutral_chroma(&self) -> u8 {
        128
    }

    /// Luma code value for white.
    #[inline]
    pub const fn white_luma(&self) -> u8 {
        match self {
            Self::Clamped => 235,
            Self::Unclamped => 255,
        }
    }
}

/// Chroma siting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YuvSampling {
    /// MPEG-2 siting (co-sited horizontally, interstitial vertically).
    #[default]
    Mpeg,
    /// JPEG/MPEG-1 siting (interstitial in both directions).
    Jpeg,
    /// DV PAL siting.
    DvPal,
    /// DV NTSC siting.
    DvNtsc,
}

/// YUV matrix / colour subspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YuvSubspace {
    /// Generic YUV.
    Yuv,
    /// ITU-R BT.601 Y'CbCr.
    #[default]
    Ycbcr,
    /// ITU-R BT.709.
    Bt709,
}

impl fmt::Display for YuvClamping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clamped => write!(f, "clamped"),
            Self::Unclamped => write!(f, "unclamped"),
        }
    }
}

impl fmt::Display for YuvSubspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv => write!(f, "yuv"),
            Self::Ycbcr => write!(f, "ycbcr"),
            Self::Bt709 => write!(f, "bt709"),
        }
    }
}

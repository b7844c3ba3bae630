//! Pixel palettes and their physical layout.
//!
//! A [`Palette`] names the arrangement of bytes in a frame's pixel data. This
//! module is the lookup table the rest of the workspace consults whenever it
//! needs to know how many planes a palette has, how many display pixels fit
//! in one addressable unit (a *macropixel*), and how wide each plane is.
//!
//! The conversion between palettes lives elsewhere; nothing here touches
//! pixel values.
//!
//! # Packed vs planar
//!
//! ```text
//! Packed (RGB24):   [R G B R G B R G B ...]          1 plane
//! Packed (UYVY):    [U Y0 V Y1 | U Y0 V Y1 ...]      1 plane, 2 px / macropixel
//! Planar (YUV420P): [Y Y Y Y ...] [U ...] [V ...]    3 planes, chroma subsampled
//! ```
//!
//! # Usage
//!
//! ```rust
//! use vfx_core::Palette;
//!
//! assert_eq!(Palette::Rgb24.plane_count(), 1);
//! assert_eq!(Palette::Yuv420P.plane_count(), 3);
//! assert_eq!(Palette::Uyvy.pixels_per_macropixel(), 2);
//! assert_eq!(Palette::Uyvy.bytes_per_macropixel(), 4);
//! ```

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Chroma subsampling of a YUV palette.
///
/// Describes how chroma planes (or chroma samples inside a packed macropixel)
/// relate to the luma grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChromaSubsampling {
    /// Not a chroma-carrying palette (RGB, alpha-only).
    #[default]
    None,
    /// Full resolution chroma.
    Yuv444,
    /// Half horizontal resolution.
    Yuv422,
    /// Half horizontal and half vertical resolution.
    Yuv420,
    /// Quarter horizontal resolution.
    Yuv411,
}

impl ChromaSubsampling {
    /// Horizontal chroma divisor (1, 2 or 4).
    #[inline]
    pub const fn horizontal_divisor(&self) -> u32 {
        match self {
            Self::None | Self::Yuv444 => 1,
            Self::Yuv422 | Self::Yuv420 => 2,
            Self::Yuv411 => 4,
        }
    }

    /// Vertical chroma divisor (1 or 2).
    #[inline]
    pub const fn vertical_divisor(&self) -> u32 {
        match self {
            Self::Yuv420 => 2,
            _ => 1,
        }
    }
}

/// Enumerated pixel format of a video frame.
///
/// Packed palettes store every component in a single plane. Planar palettes
/// split components over several planes; [`plane_count`](Self::plane_count)
/// says how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Palette {
    /// No palette assigned yet.
    #[default]
    None,
    /// 8-bit R, G, B.
    Rgb24,
    /// 8-bit B, G, R.
    Bgr24,
    /// 8-bit R, G, B, A.
    Rgba32,
    /// 8-bit B, G, R, A.
    Bgra32,
    /// 8-bit A, R, G, B.
    Argb32,
    /// 32-bit float R, G, B.
    RgbFloat,
    /// 32-bit float R, G, B, A.
    RgbaFloat,
    /// Planar Y, U, V with 4:2:0 chroma.
    Yuv420P,
    /// Planar Y, V, U with 4:2:0 chroma.
    Yvu420P,
    /// Planar Y, U, V with 4:2:2 chroma.
    Yuv422P,
    /// Planar Y, U, V at full resolution.
    Yuv444P,
    /// Planar Y, U, V, A at full resolution.
    Yuva4444P,
    /// Packed U Y0 V Y1 (4:2:2).
    Uyvy,
    /// Packed Y0 U Y1 V (4:2:2).
    Yuyv,
    /// Packed Y, U, V at full resolution.
    Yuv888,
    /// Packed Y, U, V, A at full resolution.
    Yuva8888,
    /// Packed U Y0 Y1 V Y2 Y3 (4:1:1).
    Yuv411,
    /// 8-bit alpha.
    A8,
    /// 1-bit alpha, eight pixels per byte.
    A1,
    /// 32-bit float alpha.
    AFloat,
}

/// Every assigned palette, in declaration order.
pub const ALL_PALETTES: [Palette; 20] = [
    Palette::Rgb24,
    Palette::Bgr24,
    Palette::Rgba32,
    Palette::Bgra32,
    Palette::Argb32,
    Palette::RgbFloat,
    Palette::RgbaFloat,
    Palette::Yuv420P,
    Palette::Yvu420P,
    Palette::Yuv422P,
    Palette::Yuv444P,
    Palette::Yuva4444P,
    Palette::Uyvy,
    Palette::Yuyv,
    Palette::Yuv888,
    Palette::Yuva8888,
    Palette::Yuv411,
    Palette::A8,
    Palette::A1,
    Palette::AFloat,
];

impl Palette {
    /// Number of separate data planes.
    ///
    /// Packed palettes report 1. [`Palette::None`] reports 0.
    #[inline]
    pub const fn plane_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Yuv420P | Self::Yvu420P | Self::Yuv422P | Self::Yuv444P => 3,
            Self::Yuva4444P => 4,
            _ => 1,
        }
    }

    /// Whether the palette stores its components in more than one plane.
    #[inline]
    pub const fn is_planar(&self) -> bool {
        self.plane_count() > 1
    }

    /// Display pixels encoded by one macropixel.
    #[inline]
    pub const fn pixels_per_macropixel(&self) -> u32 {
        match self {
            Self::Uyvy | Self::Yuyv => 2,
            Self::Yuv411 => 4,
            Self::A1 => 8,
            _ => 1,
        }
    }

    /// Bytes occupied by one macropixel in the first plane.
    ///
    /// For planar palettes this is the size of one sample in any plane.
    #[inline]
    pub const fn bytes_per_macropixel(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv888 => 3,
            Self::Rgba32 | Self::Bgra32 | Self::Argb32 | Self::Yuva8888 => 4,
            Self::Uyvy | Self::Yuyv => 4,
            Self::Yuv411 => 6,
            Self::RgbFloat => 12,
            Self::RgbaFloat => 16,
            Self::AFloat => 4,
            Self::Yuv420P
            | Self::Yvu420P
            | Self::Yuv422P
            | Self::Yuv444P
            | Self::Yuva4444P
            | Self::A8
            | Self::A1 => 1,
        }
    }

    /// Chroma subsampling; [`ChromaSubsampling::None`] for non-YUV palettes.
    #[inline]
    pub const fn chroma_subsampling(&self) -> ChromaSubsampling {
        match self {
            Self::Yuv420P | Self::Yvu420P => ChromaSubsampling::Yuv420,
            Self::Yuv422P | Self::Uyvy | Self::Yuyv => ChromaSubsampling::Yuv422,
            Self::Yuv444P | Self::Yuva4444P | Self::Yuv888 | Self::Yuva8888 => {
                ChromaSubsampling::Yuv444
            }
            Self::Yuv411 => ChromaSubsampling::Yuv411,
            _ => ChromaSubsampling::None,
        }
    }

    /// Whether this is a YUV palette.
    #[inline]
    pub const fn is_yuv(&self) -> bool {
        !matches!(self.chroma_subsampling(), ChromaSubsampling::None)
    }

    /// Whether this is an RGB palette (with or without alpha).
    #[inline]
    pub const fn is_rgb(&self) -> bool {
        matches!(
            self,
            Self::Rgb24
                | Self::Bgr24
                | Self::Rgba32
                | Self::Bgra32
                | Self::Argb32
                | Self::RgbFloat
                | Self::RgbaFloat
        )
    }

    /// Whether this palette carries only an alpha channel.
    #[inline]
    pub const fn is_alpha_only(&self) -> bool {
        matches!(self, Self::A8 | Self::A1 | Self::AFloat)
    }

    /// Whether the palette has an alpha component.
    #[inline]
    pub const fn has_alpha(&self) -> bool {
        matches!(
            self,
            Self::Rgba32
                | Self::Bgra32
                | Self::Argb32
                | Self::RgbaFloat
                | Self::Yuva4444P
                | Self::Yuva8888
                | Self::A8
                | Self::A1
                | Self::AFloat
        )
    }

    /// Whether components are stored as 32-bit floats.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::RgbFloat | Self::RgbaFloat | Self::AFloat)
    }

    /// Converts a display-pixel width into macropixels, rounding up.
    #[inline]
    pub const fn macropixels_for(&self, width_pixels: u32) -> u32 {
        let ppm = self.pixels_per_macropixel();
        width_pixels.div_ceil(ppm)
    }

    /// Converts a macropixel width into display pixels, saturating at
    /// `u32::MAX`.
    #[inline]
    pub const fn pixels_for(&self, width_macropixels: u32) -> u32 {
        width_macropixels.saturating_mul(self.pixels_per_macropixel())
    }

    /// Width of plane `plane`, in samples, for a frame `width` macropixels wide.
    ///
    /// Returns 0 for planes the palette does not have.
    pub const fn plane_width(&self, plane: usize, width: u32) -> u32 {
        if plane >= self.plane_count() {
            return 0;
        }
        // Luma and alpha planes are never subsampled.
        if plane == 0 || plane == 3 || !self.is_planar() {
            return width;
        }
        width.div_ceil(self.chroma_subsampling().horizontal_divisor())
    }

    /// Height of plane `plane`, in rows, for a frame `height` rows tall.
    pub const fn plane_height(&self, plane: usize, height: u32) -> u32 {
        if plane >= self.plane_count() {
            return 0;
        }
        if plane == 0 || plane == 3 || !self.is_planar() {
            return height;
        }
        height.div_ceil(self.chroma_subsampling().vertical_divisor())
    }

    /// Minimum bytes needed for one row of plane `plane`.
    pub const fn plane_row_bytes(&self, plane: usize, width: u32) -> usize {
        self.plane_width(plane, width) as usize * self.bytes_per_macropixel()
    }

    /// Canonical short name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba32 => "rgba32",
            Self::Bgra32 => "bgra32",
            Self::Argb32 => "argb32",
            Self::RgbFloat => "rgbfloat",
            Self::RgbaFloat => "rgbafloat",
            Self::Yuv420P => "yuv420p",
            Self::Yvu420P => "yvu420p",
            Self::Yuv422P => "yuv422p",
            Self::Yuv444P => "yuv444p",
            Self::Yuva4444P => "yuva4444p",
            Self::Uyvy => "uyvy",
            Self::Yuyv => "yuyv",
            Self::Yuv888 => "yuv888",
            Self::Yuva8888 => "yuva8888",
            Self::Yuv411 => "yuv411",
            Self::A8 => "a8",
            Self::A1 => "a1",
            Self::AFloat => "afloat",
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = Error;

    /// Parses a palette name, case-insensitively. `yuv422` and `yuyv422`
    /// are accepted as aliases for the packed 4:2:2 layouts.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "none" {
            return Ok(Self::None);
        }
        let alias = match lower.as_str() {
            "uyvy422" => Some(Self::Uyvy),
            "yuyv422" | "yuy2" => Some(Self::Yuyv),
            "i420" => Some(Self::Yuv420P),
            "yv12" => Some(Self::Yvu420P),
            _ => None,
        };
        if let Some(p) = alias {
            return Ok(p);
        }
        ALL_PALETTES
            .iter()
            .copied()
            .find(|p| p.name() == lower)
            .ok_or_else(|| Error::unknown_palette(s))
    }
}

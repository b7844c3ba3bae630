//! Video frame shape and pixel storage.
//!
//! - [`PixelDescriptor`] - palette, dimensions, per-plane rowstrides, YUV
//!   metadata, gamma and host flags
//! - [`PixelData`] - the owned plane buffers themselves
//!
//! # Width
//!
//! `width` is measured in **macropixels**, the smallest addressable unit of
//! the palette. For most palettes a macropixel is one display pixel; packed
//! 4:2:2 stores two display pixels in each, 4:1:1 stores four. Use
//! [`PixelDescriptor::width_pixels`] for the displayed width.
//!
//! # Memory Layout
//!
//! Each plane is a separate `Vec<u8>` of `rowstride * rows` bytes, rows
//! top-to-bottom. Bytes past the end of a row's samples and up to the
//! rowstride are padding.
//!
//! ```text
//! plane 0: [Y Y Y Y ... pad]  ← row 0
//!          [Y Y Y Y ... pad]  ← row 1
//! plane 1: [U U ... pad]      ← half height for 4:2:0
//! plane 2: [V V ... pad]
//! ```

use rayon::prelude::*;
use vfx_core::{Gamma, Palette, YuvClamping, YuvSampling, YuvSubspace};

use crate::error::{LayerError, LayerResult};
use crate::flags::LayerFlags;

/// Rounds `bytes` up to a multiple of `alignment` (a power of two).
#[inline]
pub(crate) fn align_up(bytes: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return bytes;
    }
    (bytes + alignment - 1) & !(alignment - 1)
}

/// Physical shape of a video frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelDescriptor {
    /// Pixel format.
    pub palette: Palette,
    /// Width in macropixels.
    pub width: u32,
    /// Height in rows.
    pub height: u32,
    /// Byte stride of each plane; one entry per plane.
    pub rowstrides: Vec<usize>,
    /// YUV value range. Ignored for RGB palettes.
    pub yuv_clamping: YuvClamping,
    /// YUV chroma siting. Ignored for RGB palettes.
    pub yuv_sampling: YuvSampling,
    /// YUV matrix. Ignored for RGB palettes.
    pub yuv_subspace: YuvSubspace,
    /// Tone-response curve.
    pub gamma: Gamma,
    /// Host-private hints.
    pub flags: LayerFlags,
}

impl PixelDescriptor {
    /// Descriptor with tightly packed rowstrides.
    pub fn new(palette: Palette, width: u32, height: u32) -> Self {
        Self::with_alignment(palette, width, height, 1)
    }

    /// Descriptor with rowstrides rounded up to `alignment` bytes.
    pub fn with_alignment(palette: Palette, width: u32, height: u32, alignment: usize) -> Self {
        Self {
            palette,
            width,
            height,
            rowstrides: default_rowstrides(palette, width, alignment),
            ..Self::default()
        }
    }

    /// Number of planes the palette needs.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.palette.plane_count()
    }

    /// Displayed width in pixels.
    #[inline]
    pub fn width_pixels(&self) -> u32 {
        self.palette.pixels_for(self.width)
    }

    /// `(row_bytes, rows)` of plane `plane`; `(0, 0)` if it doesn't exist.
    pub fn plane_geometry(&self, plane: usize) -> (usize, usize) {
        if plane >= self.plane_count() {
            return (0, 0);
        }
        (
            self.palette.plane_row_bytes(plane, self.width),
            self.palette.plane_height(plane, self.height) as usize,
        )
    }

    /// Smallest legal rowstride for each plane.
    pub fn min_rowstrides(&self) -> Vec<usize> {
        default_rowstrides(self.palette, self.width, 1)
    }

    /// Whether `rowstrides` has one entry per plane.
    #[inline]
    pub fn strides_match_planes(&self) -> bool {
        self.rowstrides.len() == self.plane_count()
    }

    /// Checks stride count and minimum stride widths.
    pub fn validate(&self) -> LayerResult<()> {
        if !self.strides_match_planes() {
            return Err(LayerError::PlaneCountMismatch {
                palette: self.palette,
                expected: self.plane_count(),
                got: self.rowstrides.len(),
            });
        }
        for (plane, (&stride, min)) in self
            .rowstrides
            .iter()
            .zip(self.min_rowstrides())
            .enumerate()
        {
            if stride < min {
                return Err(LayerError::InvalidStride {
                    plane,
                    stride,
                    min_stride: min,
                });
            }
        }
        Ok(())
    }

    /// Byte size of each plane buffer.
    pub fn plane_sizes(&self) -> Vec<usize> {
        self.rowstrides
            .iter()
            .enumerate()
            .map(|(plane, stride)| {
                let (_, rows) = self.plane_geometry(plane);
                stride.saturating_mul(rows)
            })
            .collect()
    }

    /// Total byte size of all planes.
    pub fn size_in_bytes(&self) -> usize {
        self.plane_sizes()
            .into_iter()
            .fold(0usize, |acc, s| acc.saturating_add(s))
    }
}

/// Default rowstrides for `palette` at `width` macropixels.
pub fn default_rowstrides(palette: Palette, width: u32, alignment: usize) -> Vec<usize> {
    (0..palette.plane_count())
        .map(|plane| align_up(palette.plane_row_bytes(plane, width), alignment))
        .collect()
}

/// Owned pixel planes of a video frame.
///
/// Packed palettes use a single plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelData {
    planes: Vec<Vec<u8>>,
}

impl PixelData {
    /// Wraps a single packed buffer.
    pub fn packed(data: Vec<u8>) -> Self {
        Self { planes: vec![data] }
    }

    /// Wraps a set of plane buffers.
    pub fn planar(planes: Vec<Vec<u8>>) -> Self {
        Self { planes }
    }

    /// Zero-filled planes sized for `desc`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::AllocationFailed`] if any plane cannot be
    /// allocated.
    pub fn zeroed(desc: &PixelDescriptor) -> LayerResult<Self> {
        let planes = desc
            .plane_sizes()
            .into_iter()
            .map(try_alloc_zeroed)
            .collect::<LayerResult<Vec<_>>>()?;
        Ok(Self { planes })
    }

    /// Number of planes.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// All planes.
    #[inline]
    pub fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }

    /// One plane.
    #[inline]
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    /// One plane, mutably.
    #[inline]
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(Vec::as_mut_slice)
    }

    /// Total bytes across planes.
    pub fn len_bytes(&self) -> usize {
        self.planes.iter().map(Vec::len).sum()
    }

    /// Consumes the container, returning the planes.
    pub fn into_planes(self) -> Vec<Vec<u8>> {
        self.planes
    }

    /// Deep copy with each plane allocated fallibly and copied in parallel.
    pub(crate) fn try_clone(&self) -> LayerResult<Self> {
        let planes = self
            .planes
            .par_iter()
            .map(|src| -> LayerResult<Vec<u8>> {
                let mut dst = Vec::new();
                dst.try_reserve_exact(src.len())
                    .map_err(|e| LayerError::allocation_failed(src.len(), e.to_string()))?;
                dst.extend_from_slice(src);
                Ok(dst)
            })
            .collect::<LayerResult<Vec<_>>>()?;
        Ok(Self { planes })
    }

    /// Writes palette-correct black into every row of every plane.
    ///
    /// RGB becomes zero with opaque alpha; YUV becomes black luma with
    /// neutral chroma. Alpha-only palettes become fully transparent. Row
    /// padding is left untouched.
    pub fn fill_black(&mut self, desc: &PixelDescriptor) {
        let palette = desc.palette;
        let luma = desc.yuv_clamping.black_luma();
        let chroma = desc.yuv_clamping.neutral_chroma();

        for (plane, buf) in self.planes.iter_mut().enumerate() {
            let stride = desc.rowstrides.get(plane).copied().unwrap_or(0);
            let (row_bytes, _) = desc.plane_geometry(plane);
            if stride == 0 || row_bytes == 0 {
                continue;
            }
            let pattern = black_pattern(palette, plane, luma, chroma);
            buf.par_chunks_mut(stride).for_each(|row| {
                let n = row_bytes.min(row.len());
                for (dst, src) in row[..n].iter_mut().zip(pattern.iter().cycle()) {
                    *dst = *src;
                }
            });
        }
    }
}

/// One macropixel's worth of black for `plane` of `palette`.
fn black_pattern(palette: Palette, plane: usize, luma: u8, chroma: u8) -> Vec<u8> {
    const ONE_F32: [u8; 4] = 1.0f32.to_ne_bytes();
    match palette {
        Palette::Rgba32 | Palette::Bgra32 => vec![0, 0, 0, 255],
        Palette::Argb32 => vec![255, 0, 0, 0],
        Palette::RgbaFloat => {
            let mut px = vec![0u8; 12];
            px.extend_from_slice(&ONE_F32);
            px
        }
        Palette::Yuv420P | Palette::Yvu420P | Palette::Yuv422P | Palette::Yuv444P => {
            vec![if plane == 0 { luma } else { chroma }]
        }
        Palette::Yuva4444P => vec![match plane {
            0 => luma,
            3 => 255,
            _ => chroma,
        }],
        Palette::Uyvy => vec![chroma, luma, chroma, luma],
        Palette::Yuyv => vec![luma, chroma, luma, chroma],
        Palette::Yuv888 => vec![luma, chroma, chroma],
        Palette::Yuva8888 => vec![luma, chroma, chroma, 255],
        Palette::Yuv411 => vec![chroma, luma, luma, chroma, luma, luma],
        _ => vec![0],
    }
}

fn try_alloc_zeroed(size: usize) -> LayerResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|e| LayerError::allocation_failed(size, e.to_string()))?;
    buf.resize(size, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb24_default_stride() {
        let d = PixelDescriptor::new(Palette::Rgb24, 720, 480);
        assert_eq!(d.rowstrides, vec![2160]);
        assert_eq!(d.width_pixels(), 720);
        assert_eq!(d.size_in_bytes(), 2160 * 480);
    }

    #[test]
    fn test_aligned_strides() {
        let d = PixelDescriptor::with_alignment(Palette::Rgb24, 101, 2, 16);
        assert_eq!(d.rowstrides, vec![304]);
        assert_eq!(d.min_rowstrides(), vec![303]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_yuv420_planes() {
        let d = PixelDescriptor::new(Palette::Yuv420P, 720, 480);
        assert_eq!(d.rowstrides, vec![720, 360, 360]);
        assert_eq!(d.plane_sizes(), vec![720 * 480, 360 * 240, 360 * 240]);
        assert_eq!(d.plane_geometry(2), (360, 240));
        assert_eq!(d.plane_geometry(3), (0, 0));
    }

    #[test]
    fn test_packed_yuv_width() {
        let d = PixelDescriptor::new(Palette::Uyvy, 360, 2);
        assert_eq!(d.width_pixels(), 720);
        assert_eq!(d.rowstrides, vec![1440]);
    }

    #[test]
    fn test_validate() {
        let mut d = PixelDescriptor::new(Palette::Yuv422P, 64, 4);
        d.rowstrides = vec![64, 32];
        assert!(matches!(
            d.validate(),
            Err(LayerError::PlaneCountMismatch { expected: 3, got: 2, .. })
        ));
        d.rowstrides = vec![64, 31, 32];
        assert!(matches!(
            d.validate(),
            Err(LayerError::InvalidStride { plane: 1, stride: 31, min_stride: 32 })
        ));
    }

    #[test]
    fn test_zeroed() {
        let d = PixelDescriptor::new(Palette::Yuv420P, 4, 4);
        let px = PixelData::zeroed(&d).unwrap();
        assert_eq!(px.plane_count(), 3);
        assert_eq!(px.len_bytes(), 16 + 4 + 4);
        assert!(px.planes().iter().all(|p| p.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_try_clone_is_deep() {
        let px = PixelData::packed(vec![1, 2, 3]);
        let mut copy = px.try_clone().unwrap();
        copy.plane_mut(0).unwrap()[0] = 9;
        assert_eq!(px.plane(0), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_fill_black_yuv_clamped() {
        let d = PixelDescriptor::new(Palette::Yuv420P, 4, 2);
        let mut px = PixelData::zeroed(&d).unwrap();
        px.fill_black(&d);
        assert!(px.plane(0).unwrap().iter().all(|&b| b == 16));
        assert!(px.plane(1).unwrap().iter().all(|&b| b == 128));
        assert!(px.plane(2).unwrap().iter().all(|&b| b == 128));
    }

    #[test]
    fn test_fill_black_uyvy_unclamped() {
        let mut d = PixelDescriptor::new(Palette::Uyvy, 2, 1);
        d.yuv_clamping = YuvClamping::Unclamped;
        let mut px = PixelData::zeroed(&d).unwrap();
        px.fill_black(&d);
        assert_eq!(px.plane(0).unwrap(), &[128, 0, 128, 0, 128, 0, 128, 0]);
    }

    #[test]
    fn test_fill_black_keeps_padding() {
        let d = PixelDescriptor::with_alignment(Palette::Rgba32, 3, 2, 16);
        let mut px = PixelData::zeroed(&d).unwrap();
        px.fill_black(&d);
        let p = px.plane(0).unwrap();
        assert_eq!(&p[0..4], &[0, 0, 0, 255]);
        assert_eq!(&p[8..12], &[0, 0, 0, 255]);
        assert_eq!(&p[12..16], &[0, 0, 0, 0]);
        assert_eq!(&p[16..20], &[0, 0, 0, 255]);
    }
}

//! Video descriptor and pixel buffer access.

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::{debug, warn};
use vfx_core::{Gamma, Palette, YuvClamping, YuvSampling, YuvSubspace};

use super::{Layer, Payload, VideoPayload};
use crate::error::{LayerError, LayerResult};
use crate::flags::LayerFlags;
use crate::pixel::{default_rowstrides, PixelData, PixelDescriptor};

/// Palette implied by a file extension, if the extension is known.
fn palette_for_ext(ext: &str) -> Option<Palette> {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(Palette::Rgb24),
        "png" | "tga" | "webp" => Some(Palette::Rgba32),
        "exr" | "hdr" => Some(Palette::RgbaFloat),
        _ => None,
    }
}

impl Layer {
    fn video(&self) -> Option<MappedRwLockReadGuard<'_, VideoPayload>> {
        let data = self.read_live()?;
        RwLockReadGuard::try_map(data, |d| match &d.payload {
            Payload::Video(v) => Some(v),
            _ => None,
        })
        .ok()
    }

    fn video_mut(&self) -> Option<MappedRwLockWriteGuard<'_, VideoPayload>> {
        let data = self.write_live()?;
        RwLockWriteGuard::try_map(data, |d| match &mut d.payload {
            Payload::Video(v) => Some(v),
            _ => None,
        })
        .ok()
    }

    /// Applies a size change to the descriptor and recomputes the
    /// rowstrides. Ignored while pixels are present, since the planes
    /// would no longer match.
    fn edit_size(&self, edit: impl FnOnce(&mut PixelDescriptor)) {
        let alignment = self.shared.config.rowstride_alignment;
        if let Some(mut v) = self.video_mut() {
            let mut desc = v.desc.clone();
            edit(&mut desc);
            if (desc.width, desc.height) == (v.desc.width, v.desc.height) {
                return;
            }
            if v.pixels.is_some() {
                warn!(
                    layer = %self.id(),
                    width = desc.width,
                    height = desc.height,
                    "size change with pixels present, ignored"
                );
                return;
            }
            desc.rowstrides = default_rowstrides(desc.palette, desc.width, alignment);
            v.desc = desc;
        }
    }

    /// Copy of the full pixel descriptor.
    pub fn pixel_descriptor(&self) -> Option<PixelDescriptor> {
        self.video().map(|v| v.desc.clone())
    }

    /// Pixel layout; `Palette::None` if unset or not a live video layer.
    pub fn palette(&self) -> Palette {
        self.video().map(|v| v.desc.palette).unwrap_or_default()
    }

    /// Sets the pixel layout.
    ///
    /// Without pixel data the rowstrides are reset to the palette's
    /// defaults. With pixel data present, only a palette with the same
    /// plane count is accepted, so existing buffers keep a valid shape.
    pub fn set_palette(&self, palette: Palette) -> &Self {
        let alignment = self.shared.config.rowstride_alignment;
        if let Some(mut v) = self.video_mut() {
            if v.pixels.is_some() && palette.plane_count() != v.desc.palette.plane_count() {
                warn!(
                    layer = %self.id(),
                    from = %v.desc.palette,
                    to = %palette,
                    "palette change would reshape existing planes, ignored"
                );
                return self;
            }
            v.desc.palette = palette;
            if v.pixels.is_none() {
                v.desc.rowstrides = default_rowstrides(palette, v.desc.width, alignment);
            }
        }
        self
    }

    /// Sets the palette together with its YUV metadata.
    pub fn set_palette_yuv(
        &self,
        palette: Palette,
        clamping: YuvClamping,
        sampling: YuvSampling,
        subspace: YuvSubspace,
    ) -> &Self {
        self.set_palette(palette);
        if let Some(mut v) = self.video_mut() {
            if v.desc.palette == palette {
                v.desc.yuv_clamping = clamping;
                v.desc.yuv_sampling = sampling;
                v.desc.yuv_subspace = subspace;
            }
        }
        self
    }

    /// Transfer function of the pixel values.
    pub fn gamma(&self) -> Gamma {
        self.video().map(|v| v.desc.gamma).unwrap_or_default()
    }

    /// Sets the transfer function.
    pub fn set_gamma(&self, gamma: Gamma) -> &Self {
        if let Some(mut v) = self.video_mut() {
            v.desc.gamma = gamma;
        }
        self
    }

    /// YUV luma range. `None` unless the palette is YUV.
    pub fn yuv_clamping(&self) -> Option<YuvClamping> {
        self.video()
            .filter(|v| v.desc.palette.is_yuv())
            .map(|v| v.desc.yuv_clamping)
    }

    /// Sets the YUV luma range.
    pub fn set_yuv_clamping(&self, clamping: YuvClamping) -> &Self {
        if let Some(mut v) = self.video_mut() {
            v.desc.yuv_clamping = clamping;
        }
        self
    }

    /// YUV chroma siting. `None` unless the palette is YUV.
    pub fn yuv_sampling(&self) -> Option<YuvSampling> {
        self.video()
            .filter(|v| v.desc.palette.is_yuv())
            .map(|v| v.desc.yuv_sampling)
    }

    /// Sets the YUV chroma siting.
    pub fn set_yuv_sampling(&self, sampling: YuvSampling) -> &Self {
        if let Some(mut v) = self.video_mut() {
            v.desc.yuv_sampling = sampling;
        }
        self
    }

    /// YUV colour matrix. `None` unless the palette is YUV.
    pub fn yuv_subspace(&self) -> Option<YuvSubspace> {
        self.video()
            .filter(|v| v.desc.palette.is_yuv())
            .map(|v| v.desc.yuv_subspace)
    }

    /// Sets the YUV colour matrix.
    pub fn set_yuv_subspace(&self, subspace: YuvSubspace) -> &Self {
        if let Some(mut v) = self.video_mut() {
            v.desc.yuv_subspace = subspace;
        }
        self
    }

    /// Width in macropixels.
    pub fn width(&self) -> u32 {
        self.video().map(|v| v.desc.width).unwrap_or(0)
    }

    /// Width in display pixels.
    pub fn width_pixels(&self) -> u32 {
        self.video().map(|v| v.desc.width_pixels()).unwrap_or(0)
    }

    /// Height in rows.
    pub fn height(&self) -> u32 {
        self.video().map(|v| v.desc.height).unwrap_or(0)
    }

    /// Sets the width in macropixels. Ignored while pixels are present.
    pub fn set_width(&self, width: u32) -> &Self {
        self.edit_size(|d| d.width = width);
        self
    }

    /// Sets the height in rows. Ignored while pixels are present.
    pub fn set_height(&self, height: u32) -> &Self {
        self.edit_size(|d| d.height = height);
        self
    }

    /// Sets width (macropixels) and height together.
    pub fn set_size(&self, width: u32, height: u32) -> &Self {
        self.edit_size(|d| {
            d.width = width;
            d.height = height;
        });
        self
    }

    /// Rowstride of the first plane; 0 if none.
    pub fn rowstride(&self) -> usize {
        self.video()
            .and_then(|v| v.desc.rowstrides.first().copied())
            .unwrap_or(0)
    }

    /// Rowstride of every plane.
    pub fn rowstrides(&self) -> Vec<usize> {
        self.video()
            .map(|v| v.desc.rowstrides.clone())
            .unwrap_or_default()
    }

    /// Sets the rowstride of a single-plane palette.
    pub fn set_rowstride(&self, stride: usize) -> &Self {
        if let Some(mut v) = self.video_mut() {
            if v.desc.palette.is_planar() {
                debug!(layer = %self.id(), palette = %v.desc.palette, "set_rowstride on planar palette ignored");
                return self;
            }
            v.desc.rowstrides = vec![stride];
        }
        self
    }

    /// Sets every plane's rowstride. Ignored unless there is exactly one
    /// stride per plane.
    pub fn set_rowstrides(&self, strides: &[usize]) -> &Self {
        if let Some(mut v) = self.video_mut() {
            if strides.len() != v.desc.plane_count() {
                warn!(
                    layer = %self.id(),
                    expected = v.desc.plane_count(),
                    got = strides.len(),
                    "rowstride count does not match planes, ignored"
                );
                return self;
            }
            v.desc.rowstrides = strides.to_vec();
        }
        self
    }

    /// Host hints.
    pub fn flags(&self) -> LayerFlags {
        self.video().map(|v| v.desc.flags).unwrap_or_default()
    }

    /// Replaces the host hints.
    pub fn set_flags(&self, flags: LayerFlags) -> &Self {
        if let Some(mut v) = self.video_mut() {
            v.desc.flags = flags;
        }
        self
    }

    /// Whether pixel planes are present.
    pub fn has_pixel_data(&self) -> bool {
        self.video().is_some_and(|v| v.pixels.is_some())
    }

    /// Read access to the pixel planes.
    pub fn pixel_data(&self) -> Option<MappedRwLockReadGuard<'_, PixelData>> {
        MappedRwLockReadGuard::try_map(self.video()?, |v| v.pixels.as_ref()).ok()
    }

    /// Write access to the pixel planes.
    pub fn pixel_data_mut(&self) -> Option<MappedRwLockWriteGuard<'_, PixelData>> {
        MappedRwLockWriteGuard::try_map(self.video_mut()?, |v| v.pixels.as_mut()).ok()
    }

    /// Replaces the pixel planes.
    ///
    /// Accepted only on a live video layer in a data-bearing status, with
    /// one buffer per plane of the current palette.
    pub fn set_pixel_data(&self, pixels: PixelData) -> &Self {
        let status = self.status();
        if !status.is_data_bearing() {
            debug!(layer = %self.id(), %status, "pixel data outside a data-bearing status ignored");
            return self;
        }
        if let Some(mut v) = self.video_mut() {
            if !self.stored_status().is_data_bearing() {
                return self;
            }
            if pixels.plane_count() != v.desc.plane_count() {
                warn!(
                    layer = %self.id(),
                    palette = %v.desc.palette,
                    expected = v.desc.plane_count(),
                    got = pixels.plane_count(),
                    "pixel plane count mismatch, ignored"
                );
                return self;
            }
            v.pixels = Some(pixels);
        }
        self
    }

    /// Replaces the pixels of a packed palette.
    pub fn set_pixel_data_packed(&self, data: Vec<u8>) -> &Self {
        self.set_pixel_data(PixelData::packed(data))
    }

    /// Replaces the pixels of a planar palette.
    pub fn set_pixel_data_planar(&self, planes: Vec<Vec<u8>>) -> &Self {
        self.set_pixel_data(PixelData::planar(planes))
    }

    /// Swaps descriptor and pixels in one step, as a converter does when it
    /// changes the palette of a loaded frame.
    ///
    /// # Errors
    ///
    /// [`LayerError::PlaneCountMismatch`] or [`LayerError::InvalidStride`]
    /// if `desc` is inconsistent or `pixels` has the wrong plane count.
    /// Dead, non-video or non-data-bearing layers are left alone and
    /// return `Ok`.
    pub fn replace_pixels(&self, desc: PixelDescriptor, pixels: PixelData) -> LayerResult<()> {
        desc.validate()?;
        if pixels.plane_count() != desc.plane_count() {
            return Err(LayerError::PlaneCountMismatch {
                palette: desc.palette,
                expected: desc.plane_count(),
                got: pixels.plane_count(),
            });
        }
        if !self.status().is_data_bearing() {
            return Ok(());
        }
        if let Some(mut v) = self.video_mut() {
            if self.stored_status().is_data_bearing() {
                v.desc = desc;
                v.pixels = Some(pixels);
            }
        }
        Ok(())
    }

    /// Removes and returns the pixel planes, leaving the descriptor.
    pub fn nullify_pixel_data(&self) -> Option<PixelData> {
        self.video_mut()?.pixels.take()
    }

    /// Sum of `rowstride * rows` over the planes; 0 without pixel data.
    pub fn size_in_bytes(&self) -> usize {
        self.video()
            .filter(|v| v.pixels.is_some())
            .map(|v| v.desc.size_in_bytes())
            .unwrap_or(0)
    }

    /// Overwrites the pixels with palette-correct black.
    pub fn fill_blank(&self) -> &Self {
        if let Some(mut v) = self.video_mut() {
            let VideoPayload { desc, pixels } = &mut *v;
            if let Some(px) = pixels.as_mut() {
                px.fill_black(desc);
            }
        }
        self
    }

    /// File extension of the source image, as a guessing hint.
    pub fn image_ext(&self) -> Option<String> {
        self.read_live().and_then(|d| d.image_ext.clone())
    }

    /// Records the source image's file extension.
    pub fn set_image_ext(&self, ext: impl Into<String>) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.image_ext = Some(ext.into());
        }
        self
    }

    /// Palette the consumer would like, as a guessing hint.
    pub fn target_palette(&self) -> Option<Palette> {
        self.read_live().and_then(|d| d.target_palette)
    }

    /// Records the palette the consumer would like.
    pub fn set_target_palette(&self, palette: Palette) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.target_palette = Some(palette);
        }
        self
    }

    /// Best guess at the palette a loader will produce.
    ///
    /// An explicit palette wins, then the target palette, then the image
    /// extension, then `Rgb24`. `Palette::None` for dead or non-video
    /// layers.
    pub fn guess_palette(&self) -> Palette {
        let Some(data) = self.read_live() else {
            return Palette::None;
        };
        let Payload::Video(v) = &data.payload else {
            return Palette::None;
        };
        if v.desc.palette != Palette::None {
            return v.desc.palette;
        }
        data.target_palette
            .filter(|p| *p != Palette::None)
            .or_else(|| data.image_ext.as_deref().and_then(palette_for_ext))
            .unwrap_or(Palette::Rgb24)
    }
}

//! Deep copies and buffer hand-off between layers.

use std::sync::atomic::Ordering;

use tracing::{debug, trace, warn};

use super::{Layer, LayerData, Payload};
use crate::error::{LayerError, LayerResult, TransferError};

impl Layer {
    /// Deep-copies `src`: identity, descriptors, buffers, status, timing
    /// and source-group link.
    ///
    /// With `dest` of `None` a new layer with one reference is returned.
    /// Otherwise `dest` is overwritten, keeps its own reference count, and
    /// a handle to it is returned. A reused `dest` only ever moves forward:
    /// it takes `src`'s status when that status is the same or later.
    /// Copying a layer onto itself is a no-op.
    ///
    /// # Errors
    ///
    /// [`LayerError::KindMismatch`] if `dest` carries a different kind,
    /// [`TransferError::InvalidDest`] if `dest` is invalid or destroyed,
    /// [`LayerError::IllegalTransition`] if `src`'s status is behind
    /// `dest`'s, [`LayerError::AllocationFailed`] if the buffers can't be
    /// duplicated. Nothing is modified on error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vfx_core::{Gamma, Palette};
    /// use vfx_layer::Layer;
    ///
    /// let a = Layer::create_blank(4, 4, Palette::Rgb24, Gamma::Srgb).unwrap();
    /// let b = Layer::copy(None, &a).unwrap();
    /// b.pixel_data_mut().unwrap().plane_mut(0).unwrap()[0] = 255;
    /// assert_eq!(a.pixel_data().unwrap().plane(0).unwrap()[0], 0);
    /// ```
    pub fn copy(dest: Option<&Layer>, src: &Layer) -> LayerResult<Layer> {
        if let Some(dest) = dest {
            if dest.same_layer(src) {
                return Ok(dest.clone());
            }
            if dest.kind() != src.kind() {
                return Err(LayerError::KindMismatch {
                    expected: dest.kind(),
                    got: src.kind(),
                });
            }
            if !dest.is_valid() {
                return Err(TransferError::InvalidDest.into());
            }
        }

        let (snapshot, status, invalid) = {
            let data = src.shared.data.read();
            let invalid = src.shared.invalid.load(Ordering::Acquire);
            (data.try_clone()?, src.status(), invalid)
        };

        let target = match dest {
            Some(dest) => dest.clone(),
            None => Layer::builder(src.kind())
                .config(src.shared.config.clone())
                .clock(src.shared.clock.clone())
                .build(),
        };
        let has_data = snapshot.payload.has_data();
        {
            let _signal = target.shared.signal.lock();
            let mut data = target.shared.data.write();
            if dest.is_some() {
                // Checked again under the locks: dest may have been
                // cancelled or advanced since the snapshot.
                if !target.is_valid() {
                    return Err(TransferError::InvalidDest.into());
                }
                let from = target.stored_status();
                if !status.has_reached(from) {
                    warn!(src = %src.id(), dst = %target.id(), %from, to = %status, "copy would move dest backwards");
                    return Err(LayerError::IllegalTransition { from, to: status });
                }
            }
            *data = snapshot;
            target.force_status(status, invalid);
        }
        debug!(src = %src.id(), dst = %target.id(), %status, has_data, "layer copied");
        Ok(target)
    }

    /// Same as `Layer::copy(None, self)`.
    pub fn duplicate(&self) -> LayerResult<Layer> {
        Layer::copy(None, self)
    }

    /// Moves the buffers and their descriptor from `src` into `dst`
    /// without copying.
    ///
    /// `src` keeps its status with no buffers. `dst` adopts `src`'s status
    /// unless it was already data-bearing. Transferring a layer into itself
    /// is a successful no-op.
    ///
    /// # Errors
    ///
    /// Checked in order: [`TransferError::InvalidSource`],
    /// [`TransferError::InvalidDest`], [`TransferError::KindMismatch`],
    /// [`TransferError::NoData`]. Neither layer changes on error.
    pub fn transfer_pixel_data(dst: &Layer, src: &Layer) -> Result<(), TransferError> {
        if dst.same_layer(src) {
            return Ok(());
        }
        check_transfer(dst, src)?;

        let _signal = dst.shared.signal.lock();
        let (mut src_data, mut dst_data) = if src.id() < dst.id() {
            let s = src.shared.data.write();
            (s, dst.shared.data.write())
        } else {
            let d = dst.shared.data.write();
            (src.shared.data.write(), d)
        };
        // Either side may have been invalidated while we waited.
        check_transfer(dst, src)?;
        move_payload(&mut src_data, &mut dst_data)?;

        let src_status = src.status();
        let dst_status = dst.status();
        if !dst_status.is_data_bearing() && src_status.is_data_bearing() {
            dst_data.record(src_status, dst.now());
            dst.force_status(src_status, false);
        }
        trace!(src = %src.id(), dst = %dst.id(), "pixel data transferred");
        Ok(())
    }
}

fn check_transfer(dst: &Layer, src: &Layer) -> Result<(), TransferError> {
    if !src.is_valid() {
        return Err(TransferError::InvalidSource);
    }
    if !dst.is_valid() {
        return Err(TransferError::InvalidDest);
    }
    if src.kind() != dst.kind() {
        return Err(TransferError::KindMismatch {
            src: src.kind(),
            dst: dst.kind(),
        });
    }
    Ok(())
}

fn move_payload(src: &mut LayerData, dst: &mut LayerData) -> Result<(), TransferError> {
    match (&mut src.payload, &mut dst.payload) {
        (Payload::Video(s), Payload::Video(d)) => {
            let pixels = s.pixels.take().ok_or(TransferError::NoData)?;
            d.desc = s.desc.clone();
            d.pixels = Some(pixels);
        }
        (Payload::Audio(s), Payload::Audio(d)) => {
            let samples = s.samples.take().ok_or(TransferError::NoData)?;
            d.desc = s.desc;
            d.samples = Some(samples);
        }
        _ => return Err(TransferError::NoData),
    }
    Ok(())
}

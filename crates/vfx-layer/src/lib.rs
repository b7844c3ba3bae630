//! # vfx-layer
//!
//! Reference-counted video frames and audio packets for the VFX-RS playback
//! pipeline.
//!
//! A [`Layer`] travels from the clip source that decodes it, through an
//! optional conversion step, to the viewer or exporter that consumes it.
//! Producer and consumer threads share it and coordinate through its
//! [`LayerStatus`]:
//!
//! ```text
//! None -> Prepared -> Queued -> Loading -> Loaded -> [Converting] -> Ready
//!                        any state --> Invalid (terminal)
//! ```
//!
//! - [`Layer`] - the shared handle: identity, status, buffers, ref count
//! - [`LayerRef`] - scoped reference released on drop
//! - [`PixelDescriptor`], [`PixelData`] - frame shape and plane storage
//! - [`AudioDescriptor`] - packet shape
//! - [`TimingLedger`] - per-status timestamps for pipeline profiling
//! - [`SourceGroupRef`] - weak link back to the producing clip source
//! - [`LayerConfig`] - runtime knobs loaded from YAML or the environment
//!
//! ## Quick Start
//!
//! ```rust
//! use vfx_core::{Gamma, Palette};
//! use vfx_layer::{Layer, LayerStatus};
//!
//! let layer = Layer::create_blank(720, 480, Palette::Rgb24, Gamma::Srgb)?;
//! assert_eq!(layer.status(), LayerStatus::Loaded);
//! assert_eq!(layer.rowstride(), 2160);
//!
//! let reader = layer.acquire().expect("layer is alive");
//! assert_eq!(reader.ref_count(), 2);
//! drop(reader);
//!
//! layer.set_status(LayerStatus::Ready);
//! assert_eq!(layer.ref_dec(), 0);
//! assert!(layer.is_destroyed());
//! # Ok::<(), vfx_layer::LayerError>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]. Lifecycle events are `trace`,
//! rejected operations `debug`/`warn`. Reference count changes go to the
//! `vfx_layer::refs` target when [`LayerConfig::debug_refs`] is on.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod audio;
pub mod config;
pub mod error;
pub mod flags;
pub mod layer;
pub mod pixel;
mod refs;
pub mod source;
pub mod status;
pub mod timing;

pub use audio::AudioDescriptor;
pub use config::LayerConfig;
pub use error::{LayerError, LayerResult, TransferError};
pub use flags::LayerFlags;
pub use layer::{Layer, LayerBuilder, LayerId, LayerKind, LayerRef};
pub use pixel::{default_rowstrides, PixelData, PixelDescriptor};
pub use source::{ClipSourceGroup, SourceGroupRef};
pub use status::LayerStatus;
pub use timing::{Stage, TimingEntry, TimingLedger};

/// Prelude module for convenient imports.
///
/// ```
/// use vfx_layer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ClipSourceGroup, Layer, LayerError, LayerKind, LayerRef, LayerResult, LayerStatus,
        PixelData, PixelDescriptor, SourceGroupRef, TimingLedger, TransferError,
    };
    pub use vfx_core::{Gamma, Palette};
}

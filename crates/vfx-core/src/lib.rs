//! # vfx-core
//!
//! Lookup tables shared by the VFX-RS frame pipeline.
//!
//! This crate holds pixel-format knowledge that outlives any single frame:
//!
//! - [`Palette`] - Pixel format identifier with plane count and macropixel layout
//! - [`YuvClamping`], [`YuvSampling`], [`YuvSubspace`] - YUV encoding metadata
//! - [`Gamma`] - Tone-response curve tag
//! - [`Ticks`], [`Clock`] - Monotonic timestamps for pipeline instrumentation
//!
//! ## Crate Structure
//!
//! ```text
//! vfx-core (this crate)
//!    ^
//!    |
//!    +-- vfx-layer (reference-counted frame/packet layers)
//!    +-- vfx-cli (diagnostics)
//!    +-- vfx-bench
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clock;
pub mod error;
pub mod gamma;
pub mod palette;
pub mod yuv;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, MonotonicClock, Ticks};
pub use error::*;
pub use gamma::Gamma;
pub use palette::{ChromaSubsampling, Palette, ALL_PALETTES};
pub use yuv::{YuvClamping, YuvSampling, YuvSubspace};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use vfx_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::{Clock, MonotonicClock, Ticks};
    pub use crate::error::{Error, Result};
    pub use crate::gamma::Gamma;
    pub use crate::palette::{ChromaSubsampling, Palette};
    pub use crate::yuv::{YuvClamping, YuvSampling, YuvSubspace};
}

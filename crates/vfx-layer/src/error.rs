//! Error types for layer operations.
//!
//! Most of the layer surface is deliberately forgiving: setters on a dead or
//! invalid layer are silent no-ops and getters return empty values. The
//! errors here cover the few operations that can genuinely fail:
//!
//! - [`TransferError`] - zero-copy buffer hand-off between two layers
//! - [`LayerError`] - allocation, buffer shape, status transitions, config

use crate::layer::LayerKind;
use crate::status::LayerStatus;
use thiserror::Error;
use vfx_core::Palette;

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Reasons [`Layer::transfer_pixel_data`](crate::Layer::transfer_pixel_data)
/// can refuse to move buffers.
///
/// On every error both layers are left exactly as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Source and destination hold different kinds of data.
    #[error("cannot transfer {src:?} data into a {dst:?} layer")]
    KindMismatch {
        /// Source kind
        src: LayerKind,
        /// Destination kind
        dst: LayerKind,
    },

    /// Source layer is invalid or destroyed.
    #[error("source layer is invalid")]
    InvalidSource,

    /// Destination layer is invalid or destroyed.
    #[error("destination layer is invalid")]
    InvalidDest,

    /// Source has no buffers to give (already transferred or never loaded).
    #[error("source layer holds no data")]
    NoData,
}

/// Errors that can occur while building or driving a layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Buffer allocation failed.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Number of planes or strides does not match the palette.
    #[error("{palette} needs {expected} planes, got {got}")]
    PlaneCountMismatch {
        /// Palette the planes were meant for
        palette: Palette,
        /// Planes the palette needs
        expected: usize,
        /// Planes supplied
        got: usize,
    },

    /// A rowstride is too small for its plane.
    #[error("plane {plane}: stride {stride} is less than minimum {min_stride}")]
    InvalidStride {
        /// Plane index
        plane: usize,
        /// Provided stride
        stride: usize,
        /// Minimum stride for the plane width
        min_stride: usize,
    },

    /// Status transition not allowed by the status table.
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        /// Status before the attempt
        from: LayerStatus,
        /// Requested status
        to: LayerStatus,
    },

    /// Operation needs a layer of a different kind.
    #[error("expected a {expected:?} layer, got {got:?}")]
    KindMismatch {
        /// Kind the operation needs
        expected: LayerKind,
        /// Kind of the layer supplied
        got: LayerKind,
    },

    /// Buffer hand-off failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Lookup-table error from vfx-core.
    #[error(transparent)]
    Core(#[from] vfx_core::Error),

    /// Configuration value rejected.
    #[error("invalid layer config: {0}")]
    Config(String),

    /// A process-wide config has already been installed.
    #[error("layer config already installed")]
    ConfigAlreadyInstalled,

    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LayerError {
    /// Creates a [`LayerError::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates a [`LayerError::Config`] error.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_display() {
        let err = TransferError::KindMismatch {
            src: LayerKind::Video,
            dst: LayerKind::Audio,
        };
        let msg = err.to_string();
        assert!(msg.contains("Video"));
        assert!(msg.contains("Audio"));
    }

    #[test]
    fn test_illegal_transition_display() {
        let err = LayerError::IllegalTransition {
            from: LayerStatus::Ready,
            to: LayerStatus::Loading,
        };
        assert_eq!(err.to_string(), "illegal status transition ready -> loading");
    }

    #[test]
    fn test_transfer_wraps() {
        let err: LayerError = TransferError::NoData.into();
        assert!(matches!(err, LayerError::Transfer(TransferError::NoData)));
        assert!(!err.is_allocation_error());
    }
}

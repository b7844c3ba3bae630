//! The layer status machine.
//!
//! A layer moves forward through a fixed sequence of states as its clip
//! source produces and converts data:
//!
//! ```text
//! None ─► Prepared ─► Queued ─► Loading ─► Loaded ─┬─► Converting ─► Ready
//!                                                  └──────────────────►┘
//!                     (any) ───────────────────────────────────► Invalid
//! ```
//!
//! [`LayerStatus::Tref`] is not a pipeline state. Setting it only stamps a
//! time-reference checkpoint into the layer's timing ledger.
//!
//! Pixel or audio buffers exist only in the *data-bearing* states
//! `Loading..=Ready`; see [`LayerStatus::is_data_bearing`].

use std::fmt;

/// Pipeline state of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LayerStatus {
    /// No status yet assigned.
    #[default]
    None = 0,
    /// Timestamp checkpoint; never stored as the current status.
    Tref = 1,
    /// Initialised and ready to hand to a clip source.
    Prepared = 2,
    /// Submitted to a clip source group.
    Queued = 3,
    /// Data is being produced.
    Loading = 4,
    /// Data present, conversion may still be needed.
    Loaded = 5,
    /// Palette, gamma or rate conversion in progress.
    Converting = 6,
    /// Data is final and may be consumed.
    Ready = 7,
    /// Terminal error or cancellation.
    Invalid = 8,
}

impl LayerStatus {
    /// Every status, in transition order.
    pub const ALL: [LayerStatus; 9] = [
        Self::None,
        Self::Tref,
        Self::Prepared,
        Self::Queued,
        Self::Loading,
        Self::Loaded,
        Self::Converting,
        Self::Ready,
        Self::Invalid,
    ];

    /// Decodes the stored representation. Unknown values read as `Invalid`.
    #[inline]
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::None,
            1 => Self::Tref,
            2 => Self::Prepared,
            3 => Self::Queued,
            4 => Self::Loading,
            5 => Self::Loaded,
            6 => Self::Converting,
            7 => Self::Ready,
            _ => Self::Invalid,
        }
    }

    /// Stored representation.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Pipeline states reachable in one step, not counting `Tref` and
    /// `Invalid` (both reachable from anywhere).
    pub const fn successors(self) -> &'static [LayerStatus] {
        match self {
            Self::None => &[Self::Prepared],
            Self::Prepared => &[Self::Queued],
            Self::Queued => &[Self::Loading],
            Self::Loading => &[Self::Loaded],
            Self::Loaded => &[Self::Converting, Self::Ready],
            Self::Converting => &[Self::Ready],
            Self::Tref | Self::Ready | Self::Invalid => &[],
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_advance_to(self, to: LayerStatus) -> bool {
        if matches!(to, Self::Invalid | Self::Tref) {
            return true;
        }
        self.successors().contains(&to)
    }

    /// States in which pixel/audio buffers are present.
    #[inline]
    pub const fn is_data_bearing(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Loaded | Self::Converting | Self::Ready
        )
    }

    /// `Ready` or `Invalid`: nothing further will happen to the layer.
    #[inline]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Invalid)
    }

    /// Whether the layer has reached `target` or moved past it.
    ///
    /// `Invalid` counts as past everything.
    #[inline]
    pub const fn has_reached(self, target: LayerStatus) -> bool {
        matches!(self, Self::Invalid) || self.as_u8() >= target.as_u8()
    }

    /// Short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tref => "tref",
            Self::Prepared => "prepared",
            Self::Queued => "queued",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Converting => "converting",
            Self::Ready => "ready",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for LayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Non-owning association between a layer and the clip source that fills it.
//!
//! The decode pipeline that actually produces frames lives outside this
//! crate. A layer only remembers *which* source is responsible for it, via a
//! [`SourceGroupRef`] wrapping a [`Weak`] pointer:
//!
//! - the layer never keeps a source group alive, so closing a clip is never
//!   blocked by frames still in flight;
//! - the source group never keeps a layer alive;
//! - a layer whose source has gone away reports it as dead instead of
//!   dangling.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vfx_layer::{ClipSourceGroup, Layer, SourceGroupRef};
//!
//! struct Decoder;
//! impl ClipSourceGroup for Decoder {}
//!
//! let decoder = Arc::new(Decoder);
//! let layer = Layer::new_for_frame(3, 42);
//! layer.set_source_group(SourceGroupRef::new(&decoder));
//! assert!(layer.source_group_alive());
//!
//! drop(decoder);
//! assert!(!layer.source_group_alive());
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

/// A clip's decode/produce pipeline, as seen from a layer.
///
/// The layer subsystem never calls into a source group; implementors only
/// need to be shareable across threads.
pub trait ClipSourceGroup: Send + Sync + 'static {
    /// Optional human-readable label used in diagnostics.
    fn label(&self) -> &str {
        ""
    }
}

/// Weak handle to a [`ClipSourceGroup`].
#[derive(Clone)]
pub struct SourceGroupRef {
    group: Weak<dyn ClipSourceGroup>,
}

impl SourceGroupRef {
    /// Creates a weak handle to `group`.
    pub fn new<G: ClipSourceGroup>(group: &Arc<G>) -> Self {
        let group: Weak<G> = Arc::downgrade(group);
        Self { group }
    }

    /// Wraps an existing weak pointer.
    pub fn from_weak(group: Weak<dyn ClipSourceGroup>) -> Self {
        Self { group }
    }

    /// Upgrades to a strong handle if the group still exists.
    pub fn upgrade(&self) -> Option<Arc<dyn ClipSourceGroup>> {
        self.group.upgrade()
    }

    /// Whether the group still exists.
    pub fn is_alive(&self) -> bool {
        self.group.strong_count() > 0
    }

    /// Whether both handles point at the same group.
    pub fn same_group(&self, other: &SourceGroupRef) -> bool {
        std::ptr::addr_eq(self.group.as_ptr(), other.group.as_ptr())
    }
}

impl fmt::Debug for SourceGroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(g) => f
                .debug_struct("SourceGroupRef")
                .field("label", &g.label())
                .finish(),
            None => f.write_str("SourceGroupRef(<gone>)"),
        }
    }
}

//! Logical reference counting with optional call-site tracing.
//!
//! Every holder of a layer that intends to read it takes a reference with
//! `ref_inc` and gives it back with `ref_dec`. The count is a plain
//! [`AtomicI32`] updated with compare-and-swap loops so it never moves past
//! zero in either direction:
//!
//! - incrementing a count that has already reached zero is refused (a
//!   destroyed layer cannot be resurrected);
//! - decrementing below zero is a programming error: `debug_assert!` in
//!   debug builds, clamped and logged in release builds.
//!
//! With `debug_refs` enabled every change is logged at `debug` under the
//! `vfx_layer::refs` target together with the caller's source location.

use std::panic::Location;
use std::sync::atomic::{AtomicI32, Ordering};

use tracing::{debug, error, warn};

use crate::layer::LayerId;

/// Result of a decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Released {
    /// Count after the decrement.
    pub remaining: i32,
    /// This decrement took the count to zero; the caller must destroy.
    pub last: bool,
}

#[derive(Debug)]
pub(crate) struct RefCounter {
    count: AtomicI32,
    trace: bool,
}

impl RefCounter {
    pub(crate) fn new(trace: bool) -> Self {
        Self {
            count: AtomicI32::new(1),
            trace,
        }
    }

    #[inline]
    pub(crate) fn get(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) fn inc(&self, id: LayerId, site: &'static Location<'static>) -> i32 {
        let mut cur = self.count.load(Ordering::Acquire);
        loop {
            if cur <= 0 {
                warn!(layer = %id, site = %site, "ref_inc on a destroyed layer");
                return 0;
            }
            match self.count.compare_exchange_weak(
                cur,
                cur + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
        let refs = cur + 1;
        if self.trace {
            debug!(target: "vfx_layer::refs", layer = %id, refs, site = %site, "ref_inc");
        }
        refs
    }

    pub(crate) fn dec(&self, id: LayerId, site: &'static Location<'static>) -> Released {
        let mut cur = self.count.load(Ordering::Acquire);
        loop {
            if cur <= 0 {
                error!(layer = %id, site = %site, "ref_dec below zero");
                debug_assert!(cur > 0, "layer {id}: ref_dec below zero at {site}");
                return Released {
                    remaining: 0,
                    last: false,
                };
            }
            match self.count.compare_exchange_weak(
                cur,
                cur - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
        let refs = cur - 1;
        if self.trace {
            debug!(target: "vfx_layer::refs", layer = %id, refs, site = %site, "ref_dec");
        }
        Released {
            remaining: refs,
            last: refs == 0,
        }
    }
}

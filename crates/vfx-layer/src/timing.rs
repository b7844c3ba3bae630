//! Per-transition timestamps for diagnosing pipeline stalls.
//!
//! A [`TimingLedger`] is optional. When a layer has one attached, every
//! accepted status transition appends a `(status, ticks)` entry, and
//! [`LayerStatus::Tref`] checkpoints append an entry without changing the
//! status. The ledger can then answer "how long did this frame sit in
//! `Queued`?" and "which stage was slowest?".
//!
//! # Example
//!
//! ```rust
//! use vfx_core::Ticks;
//! use vfx_layer::{LayerStatus, TimingLedger};
//!
//! let mut ledger = TimingLedger::new();
//! ledger.record(LayerStatus::Queued, Ticks::from_millis(0));
//! ledger.record(LayerStatus::Loading, Ticks::from_millis(40));
//! ledger.record(LayerStatus::Loaded, Ticks::from_millis(45));
//!
//! let wait = ledger.elapsed(LayerStatus::Queued, LayerStatus::Loading);
//! assert_eq!(wait, Some(Ticks::from_millis(40)));
//! ```

use crate::status::LayerStatus;
use vfx_core::Ticks;

/// One recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingEntry {
    /// Status entered (or `Tref` for checkpoints).
    pub status: LayerStatus,
    /// When it happened.
    pub ticks: Ticks,
}

/// Time spent between two consecutive pipeline transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Status the layer was in.
    pub from: LayerStatus,
    /// Status it moved to.
    pub to: LayerStatus,
    /// How long it stayed in `from`.
    pub duration: Ticks,
}

/// Ordered record of status transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingLedger {
    entries: Vec<TimingEntry>,
}

impl TimingLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&mut self, status: LayerStatus, ticks: Ticks) {
        self.entries.push(TimingEntry { status, ticks });
    }

    /// All entries in recording order.
    #[inline]
    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First time `status` was recorded.
    pub fn first(&self, status: LayerStatus) -> Option<Ticks> {
        self.entries
            .iter()
            .find(|e| e.status == status)
            .map(|e| e.ticks)
    }

    /// Most recent time `status` was recorded.
    pub fn last(&self, status: LayerStatus) -> Option<Ticks> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.status == status)
            .map(|e| e.ticks)
    }

    /// Time from the last `from` entry to the first `to` entry after it.
    pub fn elapsed(&self, from: LayerStatus, to: LayerStatus) -> Option<Ticks> {
        let start = self.entries.iter().rposition(|e| e.status == from)?;
        let begin = self.entries[start].ticks;
        self.entries[start + 1..]
            .iter()
            .find(|e| e.status == to)
            .map(|e| e.ticks - begin)
    }

    /// Durations between consecutive pipeline transitions. `Tref`
    /// checkpoints are skipped.
    pub fn stages(&self) -> Vec<Stage> {
        let pipeline: Vec<&TimingEntry> = self
            .entries
            .iter()
            .filter(|e| e.status != LayerStatus::Tref)
            .collect();
        pipeline
            .windows(2)
            .map(|w| Stage {
                from: w[0].status,
                to: w[1].status,
                duration: w[1].ticks - w[0].ticks,
            })
            .collect()
    }

    /// The stage with the longest duration.
    pub fn slowest_stage(&self) -> Option<Stage> {
        self.stages().into_iter().max_by_key(|s| s.duration)
    }

    /// Time between the first and last entries.
    pub fn total(&self) -> Ticks {
        match (self.entries.first(), self.entries.last()) {
            (Some(a), Some(b)) => b.ticks - a.ticks,
            _ => Ticks::ZERO,
        }
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Ticks {
        Ticks::from_millis(v)
    }

    fn pipeline() -> TimingLedger {
        let mut l = TimingLedger::new();
        l.record(LayerStatus::Prepared, ms(0));
        l.record(LayerStatus::Queued, ms(2));
        l.record(LayerStatus::Tref, ms(5));
        l.record(LayerStatus::Loading, ms(30));
        l.record(LayerStatus::Loaded, ms(38));
        l.record(LayerStatus::Ready, ms(39));
        l
    }

    #[test]
    fn test_first_last() {
        let mut l = pipeline();
        l.record(LayerStatus::Tref, ms(50));
        assert_eq!(l.first(LayerStatus::Tref), Some(ms(5)));
        assert_eq!(l.last(LayerStatus::Tref), Some(ms(50)));
        assert_eq!(l.first(LayerStatus::Converting), None);
    }

    #[test]
    fn test_elapsed() {
        let l = pipeline();
        assert_eq!(l.elapsed(LayerStatus::Queued, LayerStatus::Loading), Some(ms(28)));
        assert_eq!(l.elapsed(LayerStatus::Ready, LayerStatus::Queued), None);
    }

    #[test]
    fn test_stages_skip_tref() {
        let l = pipeline();
        let stages = l.stages();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[1].from, LayerStatus::Queued);
        assert_eq!(stages[1].to, LayerStatus::Loading);
        assert_eq!(stages[1].duration, ms(28));
    }

    #[test]
    fn test_slowest_stage() {
        let slow = pipeline().slowest_stage().unwrap();
        assert_eq!(slow.from, LayerStatus::Queued);
        assert_eq!(slow.duration, ms(28));
        assert!(TimingLedger::new().slowest_stage().is_none());
    }

    #[test]
    fn test_total() {
        assert_eq!(pipeline().total(), ms(39));
        assert_eq!(TimingLedger::new().total(), Ticks::ZERO);
    }
}

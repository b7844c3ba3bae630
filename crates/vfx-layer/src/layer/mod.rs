//! The reference-counted layer.
//!
//! A [`Layer`] is one decoded video frame or one audio packet on its way from
//! a clip source, through conversion, to whoever consumes it. It combines:
//!
//! - identity (clip, frame, track) and an immutable [`LayerKind`]
//! - a [`LayerStatus`] driven forward by the pipeline
//! - owned pixel planes or per-channel samples, present only while the
//!   status is data-bearing
//! - an explicit atomic reference count
//! - an optional weak link to its [`ClipSourceGroup`](crate::ClipSourceGroup)
//!   and an optional [`TimingLedger`]
//!
//! # Handles and references
//!
//! `Layer` itself is a cheap handle. Cloning it does **not** take a
//! reference; the logical count is managed with [`Layer::ref_inc`] and
//! [`Layer::ref_dec`], or scoped with [`Layer::acquire`]. When the count
//! reaches zero the layer is destroyed exactly once: buffers are dropped, the
//! source-group link and timing ledger are cleared, and waiters wake up
//! seeing `Invalid`. Handles that outlive destruction see a dead layer on
//! which every setter is a no-op and every getter returns its empty form.
//!
//! # Threads
//!
//! The count, status and invalid flag are atomics. Descriptor and buffers
//! share one lock so a reader never sees a buffer paired with the wrong
//! rowstrides. Consumers block on [`Layer::wait_ready`] until the producer
//! reaches `Ready` or the layer is cancelled.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//! use vfx_layer::{Layer, LayerStatus};
//!
//! let layer = Layer::new_for_frame(3, 42);
//! layer.set_status(LayerStatus::Queued);
//!
//! let producer = {
//!     let layer = layer.clone();
//!     thread::spawn(move || {
//!         layer.set_status(LayerStatus::Loading);
//!         layer.set_status(LayerStatus::Loaded);
//!         layer.set_status(LayerStatus::Ready);
//!     })
//! };
//!
//! assert_eq!(layer.wait_ready(), LayerStatus::Ready);
//! producer.join().unwrap();
//! assert_eq!(layer.ref_dec(), 0);
//! ```

mod audio;
mod transfer;
mod video;

use std::fmt;
use std::ops::Deref;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};
use vfx_core::{Clock, Gamma, MonotonicClock, Palette, Ticks};

use crate::audio::AudioDescriptor;
use crate::config::LayerConfig;
use crate::error::{LayerError, LayerResult};
use crate::pixel::{PixelData, PixelDescriptor};
use crate::refs::RefCounter;
use crate::source::SourceGroupRef;
use crate::status::LayerStatus;
use crate::timing::TimingLedger;

/// What a layer carries. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayerKind {
    /// Nothing yet.
    #[default]
    None,
    /// A video frame.
    Video,
    /// An audio packet.
    Audio,
}

/// Process-unique layer identity, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VideoPayload {
    pub desc: PixelDescriptor,
    pub pixels: Option<PixelData>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AudioPayload {
    pub desc: AudioDescriptor,
    pub samples: Option<Vec<Vec<f32>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    None,
    Video(VideoPayload),
    Audio(AudioPayload),
}

impl Payload {
    fn for_kind(kind: LayerKind) -> Self {
        match kind {
            LayerKind::None => Self::None,
            LayerKind::Video => Self::Video(VideoPayload::default()),
            LayerKind::Audio => Self::Audio(AudioPayload::default()),
        }
    }

    pub(crate) fn has_data(&self) -> bool {
        match self {
            Self::None => false,
            Self::Video(v) => v.pixels.is_some(),
            Self::Audio(a) => a.samples.is_some(),
        }
    }

    /// Allocates empty buffers for the current descriptor if none exist.
    fn allocate(&mut self) -> LayerResult<()> {
        match self {
            Self::None => {}
            Self::Video(v) if v.pixels.is_none() => v.pixels = Some(PixelData::zeroed(&v.desc)?),
            Self::Audio(a) if a.samples.is_none() => a.samples = Some(a.desc.silence()?),
            _ => {}
        }
        Ok(())
    }

    fn release(&mut self) {
        match self {
            Self::None => {}
            Self::Video(v) => v.pixels = None,
            Self::Audio(a) => a.samples = None,
        }
    }

    fn try_clone(&self) -> LayerResult<Self> {
        Ok(match self {
            Self::None => Self::None,
            Self::Video(v) => Self::Video(VideoPayload {
                desc: v.desc.clone(),
                pixels: v.pixels.as_ref().map(PixelData::try_clone).transpose()?,
            }),
            Self::Audio(a) => Self::Audio(AudioPayload {
                desc: a.desc,
                samples: a.samples.as_ref().map(|s| try_clone_samples(s)).transpose()?,
            }),
        })
    }
}

fn try_clone_samples(samples: &[Vec<f32>]) -> LayerResult<Vec<Vec<f32>>> {
    samples
        .iter()
        .map(|ch| -> LayerResult<Vec<f32>> {
            let mut out = Vec::new();
            out.try_reserve_exact(ch.len()).map_err(|e| {
                LayerError::allocation_failed(ch.len() * std::mem::size_of::<f32>(), e.to_string())
            })?;
            out.extend_from_slice(ch);
            Ok(out)
        })
        .collect()
}

/// Everything about a layer that sits behind its data lock.
#[derive(Debug, Clone)]
pub(crate) struct LayerData {
    pub clip_id: Option<i32>,
    pub frame: i64,
    pub track: i32,
    pub payload: Payload,
    pub source_group: Option<SourceGroupRef>,
    pub timing: Option<TimingLedger>,
    pub image_ext: Option<String>,
    pub target_palette: Option<Palette>,
}

impl LayerData {
    fn new(kind: LayerKind, timing: bool) -> Self {
        Self {
            clip_id: None,
            frame: 0,
            track: -1,
            payload: Payload::for_kind(kind),
            source_group: None,
            timing: timing.then(TimingLedger::new),
            image_ext: None,
            target_palette: None,
        }
    }

    pub(crate) fn try_clone(&self) -> LayerResult<Self> {
        Ok(Self {
            clip_id: self.clip_id,
            frame: self.frame,
            track: self.track,
            payload: self.payload.try_clone()?,
            source_group: self.source_group.clone(),
            timing: self.timing.clone(),
            image_ext: self.image_ext.clone(),
            target_palette: self.target_palette,
        })
    }

    pub(crate) fn record(&mut self, status: LayerStatus, now: Ticks) {
        if let Some(t) = self.timing.as_mut() {
            t.record(status, now);
        }
    }
}

pub(crate) struct LayerShared {
    id: LayerId,
    kind: LayerKind,
    refs: RefCounter,
    status: AtomicU8,
    invalid: AtomicBool,
    destroyed: AtomicBool,
    pub(crate) data: RwLock<LayerData>,
    /// Serialises status changes and backs `changed`.
    pub(crate) signal: Mutex<()>,
    changed: Condvar,
    config: LayerConfig,
    clock: Arc<dyn Clock>,
}

/// Handle to a reference-counted video frame or audio packet.
///
/// See the [module docs](self) for the reference and threading model.
#[derive(Clone)]
pub struct Layer {
    pub(crate) shared: Arc<LayerShared>,
}

/// Builder for layers with a non-default config or clock.
///
/// ```rust
/// use std::sync::Arc;
/// use vfx_core::ManualClock;
/// use vfx_layer::{Layer, LayerConfig, LayerKind, LayerStatus};
///
/// let cfg = LayerConfig { timing_by_default: true, ..LayerConfig::default() };
/// let layer = Layer::builder(LayerKind::Video)
///     .config(cfg)
///     .clock(Arc::new(ManualClock::default()))
///     .clip(3, 42)
///     .prepared()
///     .build();
/// assert_eq!(layer.status(), LayerStatus::Prepared);
/// assert!(layer.timing().is_some());
/// ```
pub struct LayerBuilder {
    kind: LayerKind,
    config: Option<LayerConfig>,
    clock: Option<Arc<dyn Clock>>,
    clip: Option<(i32, i64)>,
    track: i32,
    prepared: bool,
}

impl LayerBuilder {
    /// Uses `config` instead of [`LayerConfig::current`].
    pub fn config(mut self, config: LayerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `clock` for timing entries instead of [`MonotonicClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the clip id and frame number.
    pub fn clip(mut self, clip_id: i32, frame: i64) -> Self {
        self.clip = Some((clip_id, frame));
        self
    }

    /// Sets the compositing track.
    pub fn track(mut self, track: i32) -> Self {
        self.track = track;
        self
    }

    /// Starts the layer in `Prepared` instead of `None`.
    pub fn prepared(mut self) -> Self {
        self.prepared = true;
        self
    }

    /// Builds the layer with a reference count of 1.
    pub fn build(self) -> Layer {
        let status = if self.prepared {
            LayerStatus::Prepared
        } else {
            LayerStatus::None
        };
        self.build_with(status, |_| {})
    }

    /// Builds a video layer with zero-filled buffers, `width` in display
    /// pixels and default rowstrides.
    pub fn build_blank(
        self,
        width: u32,
        height: u32,
        palette: Palette,
        gamma: Gamma,
    ) -> LayerResult<Layer> {
        let alignment = self.config.clone().unwrap_or_else(LayerConfig::current).rowstride_alignment;
        let mut desc = PixelDescriptor::with_alignment(
            palette,
            palette.macropixels_for(width),
            height,
            alignment,
        );
        desc.gamma = gamma;
        self.build_video_loaded(desc)
    }

    /// Builds a video layer with zero-filled buffers using exact
    /// rowstrides; `width` is in macropixels.
    pub fn build_blank_precise(
        self,
        width: u32,
        height: u32,
        rowstrides: &[usize],
        gamma: Gamma,
        palette: Palette,
    ) -> LayerResult<Layer> {
        let desc = PixelDescriptor {
            palette,
            width,
            height,
            rowstrides: rowstrides.to_vec(),
            gamma,
            ..PixelDescriptor::default()
        };
        desc.validate()?;
        self.build_video_loaded(desc)
    }

    fn build_video_loaded(mut self, desc: PixelDescriptor) -> LayerResult<Layer> {
        self.kind = LayerKind::Video;
        let pixels = PixelData::zeroed(&desc)?;
        Ok(self.build_with(LayerStatus::Loaded, move |data| {
            data.payload = Payload::Video(VideoPayload {
                desc,
                pixels: Some(pixels),
            });
        }))
    }

    fn build_with(self, status: LayerStatus, setup: impl FnOnce(&mut LayerData)) -> Layer {
        let config = self.config.unwrap_or_else(LayerConfig::current);
        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock));
        let mut data = LayerData::new(self.kind, config.timing_by_default);
        if let Some((clip_id, frame)) = self.clip {
            data.clip_id = Some(clip_id);
            data.frame = frame;
        }
        data.track = self.track;
        setup(&mut data);
        if status != LayerStatus::None {
            data.record(status, clock.now());
        }

        let id = LayerId::next();
        trace!(layer = %id, kind = ?self.kind, %status, "layer created");
        Layer {
            shared: Arc::new(LayerShared {
                id,
                kind: self.kind,
                refs: RefCounter::new(config.debug_refs),
                status: AtomicU8::new(status.as_u8()),
                invalid: AtomicBool::new(false),
                destroyed: AtomicBool::new(false),
                data: RwLock::new(data),
                signal: Mutex::new(()),
                changed: Condvar::new(),
                config,
                clock,
            }),
        }
    }
}

impl Layer {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Starts building a layer of `kind`.
    pub fn builder(kind: LayerKind) -> LayerBuilder {
        LayerBuilder {
            kind,
            config: None,
            clock: None,
            clip: None,
            track: -1,
            prepared: false,
        }
    }

    /// Empty layer of `kind` in status `None` with one reference.
    pub fn new(kind: LayerKind) -> Self {
        Self::builder(kind).build()
    }

    /// Video layer for `frame` of `clip_id`, already `Prepared`.
    pub fn new_for_frame(clip_id: i32, frame: i64) -> Self {
        Self::builder(LayerKind::Video)
            .clip(clip_id, frame)
            .prepared()
            .build()
    }

    /// Audio layer in `Prepared` with its packet shape set.
    pub fn new_audio(sample_rate: u32, channels: u32, sample_count: usize) -> Self {
        let layer = Self::builder(LayerKind::Audio).prepared().build();
        layer.set_audio_format(sample_rate, channels, sample_count);
        layer
    }

    /// Zero-filled `Loaded` video layer. `width` is in display pixels;
    /// rowstrides follow the configured alignment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vfx_core::{Gamma, Palette};
    /// use vfx_layer::{Layer, LayerStatus};
    ///
    /// let layer = Layer::create_blank(720, 480, Palette::Rgb24, Gamma::Srgb).unwrap();
    /// assert_eq!(layer.rowstride(), 720 * 3);
    /// assert_eq!(layer.status(), LayerStatus::Loaded);
    /// ```
    pub fn create_blank(width: u32, height: u32, palette: Palette, gamma: Gamma) -> LayerResult<Self> {
        Self::builder(LayerKind::Video).build_blank(width, height, palette, gamma)
    }

    /// Zero-filled `Loaded` video layer with caller-chosen rowstrides.
    /// `width` is in macropixels.
    ///
    /// # Errors
    ///
    /// [`LayerError::PlaneCountMismatch`] if `rowstrides` does not have one
    /// entry per plane, [`LayerError::InvalidStride`] if a stride is too
    /// small, [`LayerError::AllocationFailed`] if the planes can't be
    /// allocated.
    pub fn create_blank_precise(
        width: u32,
        height: u32,
        rowstrides: &[usize],
        gamma: Gamma,
        palette: Palette,
    ) -> LayerResult<Self> {
        Self::builder(LayerKind::Video).build_blank_precise(width, height, rowstrides, gamma, palette)
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Process-unique id.
    #[inline]
    pub fn id(&self) -> LayerId {
        self.shared.id
    }

    /// What the layer carries.
    #[inline]
    pub fn kind(&self) -> LayerKind {
        self.shared.kind
    }

    /// Whether this is a video layer.
    #[inline]
    pub fn is_video(&self) -> bool {
        self.shared.kind == LayerKind::Video
    }

    /// Whether this is an audio layer.
    #[inline]
    pub fn is_audio(&self) -> bool {
        self.shared.kind == LayerKind::Audio
    }

    /// Whether both handles refer to the same layer.
    #[inline]
    pub fn same_layer(&self, other: &Layer) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// The config this layer was built with.
    pub fn config(&self) -> &LayerConfig {
        &self.shared.config
    }

    /// Owning clip, if set.
    pub fn clip_id(&self) -> Option<i32> {
        self.read_live().and_then(|d| d.clip_id)
    }

    /// Sets the owning clip.
    pub fn set_clip_id(&self, clip_id: i32) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.clip_id = Some(clip_id);
        }
        self
    }

    /// Clears the owning clip.
    pub fn unset_clip_id(&self) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.clip_id = None;
        }
        self
    }

    /// Frame index within the clip; 0 when dead.
    pub fn frame(&self) -> i64 {
        self.read_live().map(|d| d.frame).unwrap_or(0)
    }

    /// Sets the frame index.
    pub fn set_frame(&self, frame: i64) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.frame = frame;
        }
        self
    }

    /// Compositing track, -1 when unused or dead.
    pub fn track(&self) -> i32 {
        self.read_live().map(|d| d.track).unwrap_or(-1)
    }

    /// Sets the compositing track.
    pub fn set_track(&self, track: i32) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.track = track;
        }
        self
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Takes a reference; returns the new count.
    ///
    /// Returns 0 without changing anything if the layer was already
    /// destroyed.
    #[track_caller]
    pub fn ref_inc(&self) -> i32 {
        self.shared.refs.inc(self.shared.id, Location::caller())
    }

    /// Gives back a reference; returns the new count. Reaching 0 destroys
    /// the layer.
    ///
    /// Decrementing an already-destroyed layer asserts in debug builds and
    /// is clamped (and logged) in release builds.
    #[track_caller]
    pub fn ref_dec(&self) -> i32 {
        let released = self.shared.refs.dec(self.shared.id, Location::caller());
        if released.last {
            self.destroy();
        }
        released.remaining
    }

    /// Current reference count.
    #[inline]
    pub fn ref_count(&self) -> i32 {
        self.shared.refs.get()
    }

    /// Takes a reference released when the returned guard drops.
    ///
    /// `None` if the layer was already destroyed.
    #[track_caller]
    pub fn acquire(&self) -> Option<LayerRef> {
        (self.ref_inc() > 0).then(|| LayerRef {
            layer: self.clone(),
        })
    }

    /// Whether the last reference has been released.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }

    fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _signal = self.shared.signal.lock();
        {
            let mut data = self.shared.data.write();
            data.payload.release();
            data.source_group = None;
            data.timing = None;
        }
        self.shared.invalid.store(true, Ordering::Release);
        self.shared
            .status
            .store(LayerStatus::Invalid.as_u8(), Ordering::Release);
        self.shared.changed.notify_all();
        trace!(layer = %self.shared.id, "layer destroyed");
    }

    // ========================================================================
    // Validity
    // ========================================================================

    /// `false` once the layer is invalid or destroyed.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.is_dead()
    }

    /// Sets or clears the invalid flag.
    ///
    /// Setting it is the cancellation signal: equivalent to moving to
    /// `Invalid`, which drops any buffers and wakes waiters. Clearing it
    /// has no effect once the status is `Invalid`, which is terminal.
    pub fn mark_invalid(&self, invalid: bool) -> &Self {
        if self.is_destroyed() {
            return self;
        }
        if invalid {
            self.set_status(LayerStatus::Invalid);
            if !self.shared.invalid.swap(true, Ordering::AcqRel) {
                let _signal = self.shared.signal.lock();
                self.shared.changed.notify_all();
            }
            return self;
        }
        let _signal = self.shared.signal.lock();
        if self.stored_status() == LayerStatus::Invalid {
            debug!(layer = %self.shared.id, "mark_invalid(false) on an invalid layer ignored");
            return self;
        }
        self.shared.invalid.store(false, Ordering::Release);
        self
    }

    /// Status as stored, without the invalid flag folded in.
    #[inline]
    fn stored_status(&self) -> LayerStatus {
        LayerStatus::from_u8(self.shared.status.load(Ordering::Acquire))
    }

    #[inline]
    fn is_dead(&self) -> bool {
        self.shared.invalid.load(Ordering::Acquire)
            || self.is_destroyed()
            || self.stored_status() == LayerStatus::Invalid
    }

    // The liveness check is repeated once the lock is held: `Invalid` is
    // stored under the data write lock, so a guard handed out here never
    // belongs to a cancelled layer.
    pub(crate) fn read_live(&self) -> Option<RwLockReadGuard<'_, LayerData>> {
        if self.is_dead() {
            return None;
        }
        let data = self.shared.data.read();
        (!self.is_dead()).then_some(data)
    }

    pub(crate) fn write_live(&self) -> Option<RwLockWriteGuard<'_, LayerData>> {
        if self.is_dead() {
            return None;
        }
        let data = self.shared.data.write();
        (!self.is_dead()).then_some(data)
    }

    #[inline]
    pub(crate) fn now(&self) -> Ticks {
        self.shared.clock.now()
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Current status. Always `Invalid` once the invalid flag is set.
    pub fn status(&self) -> LayerStatus {
        if self.is_dead() {
            return LayerStatus::Invalid;
        }
        self.stored_status()
    }

    /// Moves to `status`, ignoring (and logging) illegal transitions.
    pub fn set_status(&self, status: LayerStatus) -> &Self {
        let _ = self.try_set_status(status);
        self
    }

    /// Moves to `status`.
    ///
    /// `Tref` only stamps the timing ledger. Entering `Loading` allocates
    /// buffers for the current descriptor if there are none; entering
    /// `Invalid` drops them and sets the invalid flag.
    ///
    /// # Errors
    ///
    /// [`LayerError::IllegalTransition`] if the table forbids the move (the
    /// layer keeps its status), [`LayerError::AllocationFailed`] if
    /// `Loading` cannot allocate.
    pub fn try_set_status(&self, to: LayerStatus) -> LayerResult<LayerStatus> {
        let id = self.shared.id;
        if self.is_destroyed() {
            if to == LayerStatus::Invalid {
                return Ok(LayerStatus::Invalid);
            }
            return Err(LayerError::IllegalTransition {
                from: LayerStatus::Invalid,
                to,
            });
        }

        if to == LayerStatus::Tref {
            let now = self.now();
            if let Some(mut d) = self.write_live() {
                d.record(LayerStatus::Tref, now);
            }
            return Ok(self.status());
        }

        let _signal = self.shared.signal.lock();
        let from = self.status();
        if from == to {
            return Ok(from);
        }
        if !from.can_advance_to(to) {
            warn!(layer = %id, %from, %to, "illegal status transition");
            debug_assert!(
                !self.shared.config.strict_transitions,
                "layer {id}: illegal status transition {from} -> {to}"
            );
            return Err(LayerError::IllegalTransition { from, to });
        }

        {
            let mut data = self.shared.data.write();
            match to {
                LayerStatus::Loading => data.payload.allocate()?,
                LayerStatus::Invalid => {
                    self.shared.invalid.store(true, Ordering::Release);
                    data.payload.release();
                }
                _ => {}
            }
            data.record(to, self.now());
            self.shared.status.store(to.as_u8(), Ordering::Release);
        }
        self.shared.changed.notify_all();
        trace!(layer = %id, %from, %to, "status");
        Ok(to)
    }

    /// Stores `status` without consulting the transition table. Used when
    /// a layer adopts the state of another one wholesale; the caller holds
    /// the signal lock and the data write lock.
    pub(crate) fn force_status(&self, status: LayerStatus, invalid: bool) {
        self.shared.invalid.store(invalid, Ordering::Release);
        self.shared.status.store(status.as_u8(), Ordering::Release);
        self.shared.changed.notify_all();
    }

    /// Blocks until the layer is `Ready` or `Invalid`; returns which.
    pub fn wait_ready(&self) -> LayerStatus {
        self.wait_until(LayerStatus::is_settled)
    }

    /// Blocks until the layer reaches `target`, passes it, or becomes
    /// `Invalid`; returns the status observed.
    pub fn wait_for(&self, target: LayerStatus) -> LayerStatus {
        self.wait_until(|s| s.has_reached(target))
    }

    fn wait_until(&self, done: impl Fn(LayerStatus) -> bool) -> LayerStatus {
        let mut guard = self.shared.signal.lock();
        loop {
            let status = self.status();
            if done(status) {
                return status;
            }
            self.shared.changed.wait(&mut guard);
        }
    }

    // ========================================================================
    // Timing
    // ========================================================================

    /// The attached timing ledger.
    pub fn timing(&self) -> Option<MappedRwLockReadGuard<'_, TimingLedger>> {
        let data = self.read_live()?;
        RwLockReadGuard::try_map(data, |d| d.timing.as_ref()).ok()
    }

    /// Attaches `ledger`, replacing any existing one.
    pub fn set_timing(&self, ledger: TimingLedger) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.timing = Some(ledger);
        }
        self
    }

    /// Attaches an empty ledger if none is attached.
    pub fn enable_timing(&self) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.timing.get_or_insert_with(TimingLedger::new);
        }
        self
    }

    /// Detaches the ledger.
    pub fn reset_timing(&self) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.timing = None;
        }
        self
    }

    // ========================================================================
    // Source group
    // ========================================================================

    /// Associates the layer with the source group that will fill it.
    pub fn set_source_group(&self, group: SourceGroupRef) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.source_group = Some(group);
        }
        self
    }

    /// The associated source group handle, if any.
    pub fn source_group(&self) -> Option<SourceGroupRef> {
        self.read_live().and_then(|d| d.source_group.clone())
    }

    /// Drops the association.
    pub fn unset_source_group(&self) -> &Self {
        if let Some(mut d) = self.write_live() {
            d.source_group = None;
        }
        self
    }

    /// Whether an associated source group still exists.
    pub fn source_group_alive(&self) -> bool {
        self.read_live()
            .and_then(|d| d.source_group.as_ref().map(SourceGroupRef::is_alive))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.shared.id)
            .field("kind", &self.shared.kind)
            .field("status", &self.status())
            .field("refs", &self.ref_count())
            .finish()
    }
}

/// A counted reference to a layer, released on drop.
///
/// Obtained from [`Layer::acquire`]. Derefs to [`Layer`].
pub struct LayerRef {
    layer: Layer,
}

impl LayerRef {
    /// The underlying handle.
    pub fn layer(&self) -> &Layer {
        &self.layer
    }
}

impl Deref for LayerRef {
    type Target = Layer;

    fn deref(&self) -> &Layer {
        &self.layer
    }
}

impl Drop for LayerRef {
    fn drop(&mut self) {
        self.layer.ref_dec();
    }
}

impl fmt::Debug for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerRef").field(&self.layer).finish()
    }
}

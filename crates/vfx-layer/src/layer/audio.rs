//! Audio packet access.

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::{debug, warn};

use super::{AudioPayload, Layer, Payload};
use crate::audio::AudioDescriptor;

impl Layer {
    fn audio(&self) -> Option<MappedRwLockReadGuard<'_, AudioPayload>> {
        let data = self.read_live()?;
        RwLockReadGuard::try_map(data, |d| match &d.payload {
            Payload::Audio(a) => Some(a),
            _ => None,
        })
        .ok()
    }

    fn audio_mut(&self) -> Option<MappedRwLockWriteGuard<'_, AudioPayload>> {
        let data = self.write_live()?;
        RwLockWriteGuard::try_map(data, |d| match &mut d.payload {
            Payload::Audio(a) => Some(a),
            _ => None,
        })
        .ok()
    }

    /// Packet shape.
    pub fn audio_descriptor(&self) -> Option<AudioDescriptor> {
        self.audio().map(|a| a.desc)
    }

    /// Sample rate in Hz; 0 if unset.
    pub fn audio_rate(&self) -> u32 {
        self.audio().map(|a| a.desc.sample_rate).unwrap_or(0)
    }

    /// Channel count.
    pub fn audio_channels(&self) -> u32 {
        self.audio().map(|a| a.desc.channels).unwrap_or(0)
    }

    /// Samples per channel.
    pub fn audio_length(&self) -> usize {
        self.audio().map(|a| a.desc.sample_count).unwrap_or(0)
    }

    /// Packet duration in seconds.
    pub fn audio_duration_secs(&self) -> f64 {
        self.audio().map(|a| a.desc.duration_secs()).unwrap_or(0.0)
    }

    /// Sets the packet shape. Ignored while samples are present.
    pub fn set_audio_format(&self, sample_rate: u32, channels: u32, sample_count: usize) -> &Self {
        if let Some(mut a) = self.audio_mut() {
            if a.samples.is_some() {
                warn!(layer = %self.id(), "audio format change with samples present, ignored");
                return self;
            }
            a.desc = AudioDescriptor::new(sample_rate, channels, sample_count);
        }
        self
    }

    /// Replaces the samples and their shape.
    ///
    /// Accepted only on a live audio layer in a data-bearing status, and
    /// only if `samples` holds `channels` buffers of `sample_count` each.
    pub fn set_audio_data(
        &self,
        samples: Vec<Vec<f32>>,
        sample_rate: u32,
        channels: u32,
        sample_count: usize,
    ) -> &Self {
        let status = self.status();
        if !status.is_data_bearing() {
            debug!(layer = %self.id(), %status, "audio data outside a data-bearing status ignored");
            return self;
        }
        let desc = AudioDescriptor::new(sample_rate, channels, sample_count);
        if !desc.matches(&samples) {
            warn!(
                layer = %self.id(),
                channels,
                sample_count,
                got_channels = samples.len(),
                "audio buffers do not match their shape, ignored"
            );
            return self;
        }
        if let Some(mut a) = self.audio_mut() {
            if self.stored_status().is_data_bearing() {
                a.desc = desc;
                a.samples = Some(samples);
            }
        }
        self
    }

    /// Whether samples are present.
    pub fn has_audio_data(&self) -> bool {
        self.audio().is_some_and(|a| a.samples.is_some())
    }

    /// Read access to the per-channel samples.
    pub fn audio_data(&self) -> Option<MappedRwLockReadGuard<'_, [Vec<f32>]>> {
        MappedRwLockReadGuard::try_map(self.audio()?, |a| a.samples.as_deref()).ok()
    }

    /// Write access to the per-channel samples.
    pub fn audio_data_mut(&self) -> Option<MappedRwLockWriteGuard<'_, [Vec<f32>]>> {
        MappedRwLockWriteGuard::try_map(self.audio_mut()?, |a| a.samples.as_deref_mut()).ok()
    }

    /// Removes and returns the samples, leaving the shape.
    pub fn nullify_audio_data(&self) -> Option<Vec<Vec<f32>>> {
        self.audio_mut()?.samples.take()
    }
}

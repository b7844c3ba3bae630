//! Audio packet shape.
//!
//! An audio layer carries one `Vec<f32>` of samples per channel, all of the
//! same length, described by an [`AudioDescriptor`].

use crate::error::{LayerError, LayerResult};

/// Shape of an audio packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioDescriptor {
    /// Samples per second.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u32,
    /// Samples per channel.
    pub sample_count: usize,
}

impl AudioDescriptor {
    /// Creates a descriptor.
    pub fn new(sample_rate: u32, channels: u32, sample_count: usize) -> Self {
        Self {
            sample_rate,
            channels,
            sample_count,
        }
    }

    /// Packet duration in seconds; 0 when the rate is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }

    /// Whether `samples` has one buffer per channel, each `sample_count` long.
    pub fn matches(&self, samples: &[Vec<f32>]) -> bool {
        samples.len() == self.channels as usize
            && samples.iter().all(|ch| ch.len() == self.sample_count)
    }

    /// Silent buffers for every channel.
    pub(crate) fn silence(&self) -> LayerResult<Vec<Vec<f32>>> {
        (0..self.channels)
            .map(|_| -> LayerResult<Vec<f32>> {
                let mut ch = Vec::new();
                ch.try_reserve_exact(self.sample_count).map_err(|e| {
                    LayerError::allocation_failed(
                        self.sample_count * std::mem::size_of::<f32>(),
                        e.to_string(),
                    )
                })?;
                ch.resize(self.sample_count, 0.0);
                Ok(ch)
            })
            .collect()
    }
}

//! In-memory audio sample buffer.
//!
//! Samples are stored as `f32` in the nominal range `[-1.0, 1.0]`. A buffer
//! is either mono (one dimension) or interleaved with N channels
//! (frames × channels); the layout is preserved by every transform.

use crate::error::{CoreError, CoreResult};

/// Memory layout of an [`AudioBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioLayout {
    /// One-dimensional mono samples
    Mono,
    /// Interleaved frames × channels
    Interleaved { channels: usize },
}

/// Audio samples with an explicit layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    layout: AudioLayout,
}

impl AudioBuffer {
    /// Wraps one-dimensional mono samples.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            layout: AudioLayout::Mono,
        }
    }

    /// Wraps interleaved samples. The sample count must be a multiple of
    /// `channels`, and `channels` must be at least one.
    pub fn interleaved(samples: Vec<f32>, channels: usize) -> CoreResult<Self> {
        if channels == 0 {
            return Err(CoreError::AudioBuffer(
                "channel count must be at least 1".to_string(),
            ));
        }
        if samples.len() % channels != 0 {
            return Err(CoreError::AudioBuffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            layout: AudioLayout::Interleaved { channels },
        })
    }

    pub fn layout(&self) -> AudioLayout {
        self.layout
    }

    /// Number of channels (1 for mono).
    pub fn channels(&self) -> usize {
        match self.layout {
            AudioLayout::Mono => 1,
            AudioLayout::Interleaved { channels } => channels,
        }
    }

    /// Number of sample frames, i.e. samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw samples in storage order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `frame` on `channel`.
    pub fn sample(&self, frame: usize, channel: usize) -> Option<f32> {
        if channel >= self.channels() {
            return None;
        }
        self.samples.get(frame * self.channels() + channel).copied()
    }

    /// Writes `value(i)` into every channel of frames `start..end`, where `i`
    /// counts from zero at `start`.
    pub(crate) fn fill_frames<F>(&mut self, start: usize, end: usize, mut value: F)
    where
        F: FnMut(usize) -> f32,
    {
        let channels = self.channels();
        let end = end.min(self.frames());
        for frame in start..end {
            let sample = value(frame - start);
            let base = frame * channels;
            self.samples[base..base + channels].fill(sample);
        }
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_buffer() {
        let buffer = AudioBuffer::mono(vec![0.1, 0.2, 0.3]);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.sample(1, 0), Some(0.2));
        assert_eq!(buffer.sample(1, 1), None);
    }

    #[test]
    fn test_interleaved_buffer() {
        let buffer = AudioBuffer::interleaved(vec![1.0, -1.0, 0.5, -0.5], 2).unwrap();
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.sample(1, 1), Some(-0.5));
        assert_eq!(buffer.layout(), AudioLayout::Interleaved { channels: 2 });
    }

    #[test]
    fn test_interleaved_rejects_bad_shapes() {
        assert!(AudioBuffer::interleaved(vec![0.0; 3], 2).is_err());
        assert!(AudioBuffer::interleaved(vec![0.0; 4], 0).is_err());
    }

    #[test]
    fn test_fill_frames_writes_every_channel() {
        let mut buffer = AudioBuffer::interleaved(vec![1.0; 8], 2).unwrap();
        buffer.fill_frames(1, 3, |i| i as f32 * 0.5);
        assert_eq!(buffer.samples(), &[1.0, 1.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0]);
    }
}

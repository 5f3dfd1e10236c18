//! Audio decoding and playback
//!
//! The backend streams raw PCM (16-bit signed LE, mono, 24 kHz) hex-encoded
//! inside JSON frames. `pcm` turns those payloads into normalized f32
//! samples, `sink` abstracts the output device and `playback` enforces the
//! one-active-playback invariant.

pub mod pcm;
pub mod playback;
pub mod sink;

pub use playback::{PlaybackDriver, PlaybackEnd};
pub use sink::{AudioSink, NullSink};

#[cfg(feature = "audio-io")]
pub use sink::CpalSink;

use serde::{Deserialize, Serialize};

/// A decoded audio buffer ready for playback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_seconds() as f64 * 1000.0
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

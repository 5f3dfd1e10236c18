//! Audio output sinks
//!
//! A sink plays one buffer at a time and reports natural completion through
//! a channel; stopping discards playback without signalling. `CpalSink`
//! talks to the default output device, `NullSink` is a timing-faithful
//! stand-in for headless environments and tests.

use crate::audio::AudioData;
use crate::Result;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// An audio output that plays one buffer at a time.
///
/// `start` must signal `finished` exactly once when the buffer drains
/// naturally. A later `stop` (or a replacing `start`) discards the playback
/// without signalling; the driver layered on top turns that into an
/// explicit stopped notification.
pub trait AudioSink {
    fn start(&mut self, audio: AudioData, finished: Sender<()>) -> Result<()>;
    fn stop(&mut self);
}

/// Sink that plays silence but keeps real-time pacing.
///
/// Signals completion after the buffer's wall-clock duration, so the rest
/// of the pipeline behaves as with a real device.
#[derive(Default)]
pub struct NullSink {
    cancel: Option<Arc<AtomicBool>>,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for NullSink {
    fn start(&mut self, audio: AudioData, finished: Sender<()>) -> Result<()> {
        self.stop();

        let cancel = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::clone(&cancel);
        let duration = Duration::from_secs_f32(audio.duration_seconds().max(0.0));

        thread::spawn(move || {
            thread::sleep(duration);
            if !cancelled.load(Ordering::SeqCst) {
                let _ = finished.send(());
            }
        });

        self.cancel = Some(cancel);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(feature = "audio-io")]
pub use cpal_sink::CpalSink;

#[cfg(feature = "audio-io")]
mod cpal_sink {
    use super::*;
    use crate::StreamviewError;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Device, SampleRate, Stream, StreamConfig};
    use parking_lot::Mutex;
    use tracing::{error, info};

    struct PlayState {
        samples: Vec<f32>,
        pos: usize,
        finished: Option<Sender<()>>,
    }

    /// Sink backed by the default cpal output device
    pub struct CpalSink {
        device: Device,
        channels: u16,
        stream: Option<Stream>,
    }

    impl CpalSink {
        /// Open the default output device
        pub fn new() -> Result<Self> {
            let host = cpal::default_host();

            let device = host.default_output_device().ok_or_else(|| {
                StreamviewError::AudioDeviceError("No output device available".into())
            })?;

            info!(
                "Using output device: {}",
                device.name().unwrap_or_else(|_| "Unknown".to_string())
            );

            let channels = device
                .default_output_config()
                .map_err(|e| {
                    StreamviewError::AudioDeviceError(format!(
                        "Failed to get output config: {}",
                        e
                    ))
                })?
                .channels();

            Ok(Self {
                device,
                channels,
                stream: None,
            })
        }
    }

    impl AudioSink for CpalSink {
        fn start(&mut self, audio: AudioData, finished: Sender<()>) -> Result<()> {
            self.stop();

            let config = StreamConfig {
                channels: self.channels,
                sample_rate: SampleRate(audio.sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let channels = self.channels as usize;
            let state = Arc::new(Mutex::new(PlayState {
                samples: audio.samples,
                pos: 0,
                finished: Some(finished),
            }));
            let state_cb = Arc::clone(&state);

            let err_fn = |err| {
                error!("Audio output stream error: {}", err);
            };

            let stream = self
                .device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        let mut st = state_cb.lock();
                        let frames = data.len() / channels;

                        // Mono source replicated across device channels
                        for frame in 0..frames {
                            let sample = if st.pos < st.samples.len() {
                                let s = st.samples[st.pos];
                                st.pos += 1;
                                s
                            } else {
                                0.0
                            };
                            for c in 0..channels {
                                data[frame * channels + c] = sample;
                            }
                        }

                        if st.pos >= st.samples.len() {
                            if let Some(tx) = st.finished.take() {
                                let _ = tx.send(());
                            }
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| {
                    StreamviewError::AudioDeviceError(format!(
                        "Failed to build output stream: {}",
                        e
                    ))
                })?;

            stream.play().map_err(|e| {
                StreamviewError::AudioDeviceError(format!("Failed to start output stream: {}", e))
            })?;

            self.stream = Some(stream);
            Ok(())
        }

        fn stop(&mut self) {
            // Dropping the stream stops playback; the pending finished
            // sender is dropped with it and never fires.
            self.stream = None;
        }
    }
}

//! Playback driver
//!
//! Owns the single active playback. Starting a new buffer always tears the
//! previous one down first, and every playback delivers exactly one
//! `PlaybackEnd`: `Finished` when the sink drains naturally, `Stopped` when
//! it is replaced or explicitly stopped. Resolving on stop (instead of
//! leaving the completion pending forever) keeps callers that wait for the
//! signal from stalling.

use crate::audio::{AudioData, AudioSink};
use crate::Result;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The buffer played to completion
    Finished,
    /// Playback was stopped or replaced before completing
    Stopped,
}

struct ActivePlayback {
    cancel_tx: Sender<()>,
    watcher: JoinHandle<()>,
}

/// Drives an [`AudioSink`], holding the at-most-one-playback invariant
pub struct PlaybackDriver<S: AudioSink> {
    sink: S,
    active: Option<ActivePlayback>,
}

impl<S: AudioSink> PlaybackDriver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, active: None }
    }

    /// Start playing `audio`, stopping any in-flight playback first.
    ///
    /// The returned receiver yields exactly one [`PlaybackEnd`].
    pub fn play(&mut self, audio: AudioData) -> Result<Receiver<PlaybackEnd>> {
        self.stop();

        let (finished_tx, finished_rx) = bounded::<()>(1);
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<PlaybackEnd>(1);

        self.sink.start(audio, finished_tx)?;

        // Watcher translates the sink's natural-end signal and the driver's
        // cancellation into a single completion value.
        let watcher = thread::spawn(move || {
            let end = select! {
                recv(finished_rx) -> msg => match msg {
                    Ok(()) => PlaybackEnd::Finished,
                    // Sink dropped the sender without finishing
                    Err(_) => PlaybackEnd::Stopped,
                },
                recv(cancel_rx) -> _ => PlaybackEnd::Stopped,
            };
            let _ = done_tx.send(end);
        });

        self.active = Some(ActivePlayback { cancel_tx, watcher });
        Ok(done_rx)
    }

    /// Stop the active playback, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(playback) = self.active.take() {
            debug!("Stopping active playback");
            let _ = playback.cancel_tx.send(());
            self.sink.stop();
            let _ = playback.watcher.join();
        }
    }

    /// Whether a playback handle is currently held
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl<S: AudioSink> Drop for PlaybackDriver<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct TestSinkState {
        starts: usize,
        stops: usize,
        active: usize,
        max_active: usize,
        finished: Option<Sender<()>>,
    }

    /// Sink whose completion is fired manually by the test
    #[derive(Clone, Default)]
    struct TestSink(Arc<Mutex<TestSinkState>>);

    impl TestSink {
        fn finish_current(&self) {
            let tx = {
                let mut st = self.0.lock();
                st.active = st.active.saturating_sub(1);
                st.finished.take()
            };
            tx.expect("no active playback to finish").send(()).unwrap();
        }

        fn state(&self) -> (usize, usize, usize) {
            let st = self.0.lock();
            (st.starts, st.stops, st.max_active)
        }
    }

    impl AudioSink for TestSink {
        fn start(&mut self, _audio: AudioData, finished: Sender<()>) -> Result<()> {
            let mut st = self.0.lock();
            st.starts += 1;
            st.active += 1;
            st.max_active = st.max_active.max(st.active);
            st.finished = Some(finished);
            Ok(())
        }

        fn stop(&mut self) {
            let mut st = self.0.lock();
            if st.finished.take().is_some() {
                st.active = st.active.saturating_sub(1);
            }
            st.stops += 1;
        }
    }

    fn buffer() -> AudioData {
        AudioData::new(vec![0.0; 64], 24000, 1)
    }

    #[test]
    fn natural_finish_resolves_once() {
        let sink = TestSink::default();
        let mut driver = PlaybackDriver::new(sink.clone());

        let done = driver.play(buffer()).unwrap();
        sink.finish_current();

        assert_eq!(
            done.recv_timeout(Duration::from_millis(500)).unwrap(),
            PlaybackEnd::Finished
        );
        // Exactly once: channel is now closed with no second value
        assert!(done.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn replacement_stops_previous_playback() {
        let sink = TestSink::default();
        let mut driver = PlaybackDriver::new(sink.clone());

        let first = driver.play(buffer()).unwrap();
        let _second = driver.play(buffer()).unwrap();

        assert_eq!(
            first.recv_timeout(Duration::from_millis(500)).unwrap(),
            PlaybackEnd::Stopped
        );
        let (starts, stops, max_active) = sink.state();
        assert_eq!(starts, 2);
        assert!(stops >= 1);
        assert_eq!(max_active, 1, "more than one playback was active at once");
    }

    #[test]
    fn explicit_stop_resolves_with_stopped() {
        let sink = TestSink::default();
        let mut driver = PlaybackDriver::new(sink.clone());

        let done = driver.play(buffer()).unwrap();
        driver.stop();

        assert_eq!(
            done.recv_timeout(Duration::from_millis(500)).unwrap(),
            PlaybackEnd::Stopped
        );
        assert!(!driver.is_active());
    }

    #[test]
    fn stop_without_playback_is_a_noop() {
        let sink = TestSink::default();
        let mut driver = PlaybackDriver::new(sink.clone());

        driver.stop();
        driver.stop();

        let (_, stops, _) = sink.state();
        assert_eq!(stops, 0);
    }

    #[test]
    fn stop_after_natural_finish_keeps_finished_result() {
        let sink = TestSink::default();
        let mut driver = PlaybackDriver::new(sink.clone());

        let done = driver.play(buffer()).unwrap();
        sink.finish_current();
        assert_eq!(
            done.recv_timeout(Duration::from_millis(500)).unwrap(),
            PlaybackEnd::Finished
        );

        // A late stop must not produce a second completion
        driver.stop();
        assert!(done.recv_timeout(Duration::from_millis(50)).is_err());
    }
}

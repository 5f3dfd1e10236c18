//! Stream session worker
//!
//! One worker thread per session. It starts the transport, builds the
//! playback driver on its own thread (audio streams are not `Send`), and
//! then polls three sources: UI commands, transport events and the pending
//! playback completion. Chunk handling is fail-soft: a bad chunk is
//! reported and skipped, the stream keeps going.

use crate::audio::pcm::{decode_hex_audio, pcm16le_to_f32};
use crate::audio::{AudioData, AudioSink, PlaybackDriver, PlaybackEnd};
use crate::avatar::{SharedRenderer, Viseme, VisemeScheduler};
use crate::net::message::STATUS_REFILLING;
use crate::net::{
    ConnectionState, StartStreamResponse, StreamApi, StreamMessage, Transport, TransportConfig,
    TransportEvent, TransportHandle,
};
use crate::session::SessionConfig;
use crate::{Result, StreamviewError};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Commands the UI sends to the session
#[derive(Debug)]
enum SessionCommand {
    Start(String),
    Stop,
    Shutdown,
}

/// Events the session reports back to the UI
#[derive(Debug)]
pub enum SessionEvent {
    /// Audio output is up
    AudioReady,
    /// No audio output; the session runs silent
    AudioUnavailable(String),
    /// An avatar renderer is loaded, with its name
    AvatarReady(String),
    AvatarNotConfigured,
    /// The backend accepted the start request
    StartAccepted(StartStreamResponse),
    StartFailed(String),
    Connection(ConnectionState),
    /// A chunk arrived; `text` is the caption for it
    Chunk { text: String },
    /// The backend is generating more content
    Refilling { message: String },
    PlaybackStarted,
    /// The current chunk played to completion
    PlaybackFinished,
    /// The stream was stopped on request
    Stopped,
    Error(String),
    Shutdown,
}

/// UI-side handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: Sender<SessionCommand>,
    event_rx: Receiver<SessionEvent>,
}

impl SessionHandle {
    /// Ask the backend to start streaming `topic`
    pub fn start_stream(&self, topic: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::Start(topic.into()))
    }

    /// Stop playback and disconnect
    pub fn stop_stream(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    /// Stop the session worker entirely
    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    /// Next pending event, if any
    pub fn try_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| StreamviewError::ChannelError(format!("session command failed: {}", e)))
    }
}

/// Builds the sink on the worker thread, where the stream it opens lives
pub type SinkFactory<S> = Box<dyn FnOnce() -> Result<S> + Send>;

/// A stream session before it is started
pub struct StreamSession<S: AudioSink> {
    config: SessionConfig,
    api: Arc<dyn StreamApi>,
    sink_factory: SinkFactory<S>,
    renderer: SharedRenderer,
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
}

impl<S: AudioSink + 'static> StreamSession<S> {
    pub fn new(
        config: SessionConfig,
        api: Arc<dyn StreamApi>,
        sink_factory: SinkFactory<S>,
        renderer: SharedRenderer,
    ) -> Result<(Self, SessionHandle)> {
        config.validate()?;

        let (command_tx, command_rx) = bounded(config.queue_size);
        let (event_tx, event_rx) = bounded(config.queue_size);

        let session = Self {
            config,
            api,
            sink_factory,
            renderer,
            command_rx,
            event_tx,
        };
        let handle = SessionHandle {
            command_tx,
            event_rx,
        };
        Ok((session, handle))
    }

    /// Spawn the session worker
    pub fn start(self) -> Result<JoinHandle<()>> {
        let ws_url = self.config.ws_url()?;

        let handle = thread::Builder::new()
            .name("stream-session".to_string())
            .spawn(move || self.run(ws_url))
            .map_err(|e| StreamviewError::SessionError(format!("failed to spawn worker: {}", e)))?;
        Ok(handle)
    }

    fn run(self, ws_url: String) {
        info!("Session worker started");

        let transport = Transport::new(TransportConfig {
            ws_url,
            reconnect_delay: self.config.reconnect_delay,
        });
        let transport_handle = transport.handle();
        let transport_join = transport.start_worker();

        // The sink must be built here: audio output streams are tied to
        // the thread that opened them.
        let playback = match (self.sink_factory)() {
            Ok(sink) => {
                let _ = self.event_tx.send(SessionEvent::AudioReady);
                Some(PlaybackDriver::new(sink))
            }
            Err(e) => {
                warn!("Audio output unavailable: {}", e);
                let _ = self
                    .event_tx
                    .send(SessionEvent::AudioUnavailable(e.user_message()));
                None
            }
        };

        let avatar = {
            let renderer = self.renderer.lock();
            renderer.is_ready().then(|| renderer.name().to_string())
        };
        let _ = self.event_tx.send(match avatar {
            Some(name) => SessionEvent::AvatarReady(name),
            None => SessionEvent::AvatarNotConfigured,
        });

        let scheduler = VisemeScheduler::new(Arc::clone(&self.renderer), self.config.frame_interval);

        let mut worker = SessionWorker {
            config: self.config,
            api: self.api,
            transport: transport_handle,
            playback,
            scheduler,
            event_tx: self.event_tx.clone(),
            streaming: false,
            pending_start: None,
            pending_done: None,
        };

        loop {
            let mut worked = false;

            match self.command_rx.try_recv() {
                Ok(SessionCommand::Start(topic)) => {
                    worked = true;
                    worker.request_start(topic);
                }
                Ok(SessionCommand::Stop) => {
                    worked = true;
                    worker.teardown();
                    let _ = worker.event_tx.send(SessionEvent::Stopped);
                }
                Ok(SessionCommand::Shutdown) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            worked |= worker.poll_start_result();
            worked |= worker.poll_transport();
            worked |= worker.poll_playback_done();

            if !worked {
                thread::sleep(Duration::from_millis(10));
            }
        }

        worker.teardown();
        if let Err(e) = worker.transport.shutdown() {
            debug!("Transport already gone on shutdown: {}", e);
        }
        let _ = transport_join.join();
        let _ = worker.event_tx.send(SessionEvent::Shutdown);
        info!("Session worker stopped");
    }
}

struct SessionWorker<S: AudioSink> {
    config: SessionConfig,
    api: Arc<dyn StreamApi>,
    transport: TransportHandle,
    playback: Option<PlaybackDriver<S>>,
    scheduler: VisemeScheduler,
    event_tx: Sender<SessionEvent>,
    streaming: bool,
    pending_start: Option<Receiver<Result<StartStreamResponse>>>,
    pending_done: Option<Receiver<PlaybackEnd>>,
}

impl<S: AudioSink> SessionWorker<S> {
    /// Kick off the start-stream request on a helper thread. The call
    /// blocks until the backend has generated content, so it cannot run on
    /// the polling loop.
    fn request_start(&mut self, topic: String) {
        if self.pending_start.is_some() || self.streaming {
            debug!("Stream already running or starting, ignoring");
            return;
        }

        info!("Starting stream for topic: {}", topic);
        let (result_tx, result_rx) = bounded(1);
        let api = Arc::clone(&self.api);
        thread::spawn(move || {
            let _ = result_tx.send(api.start_stream(&topic));
        });
        self.pending_start = Some(result_rx);
    }

    fn poll_start_result(&mut self) -> bool {
        let Some(result_rx) = &self.pending_start else {
            return false;
        };

        let result = match result_rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(StreamviewError::ApiError("start request aborted".into()))
            }
        };
        self.pending_start = None;

        match result {
            Ok(response) => {
                info!(
                    "Stream accepted, {} items queued",
                    response.playlist_size.unwrap_or(0)
                );
                let _ = self.event_tx.send(SessionEvent::StartAccepted(response));
                match self.transport.connect() {
                    Ok(()) => self.streaming = true,
                    Err(e) => {
                        let _ = self.event_tx.send(SessionEvent::Error(e.user_message()));
                    }
                }
            }
            Err(e) => {
                warn!("Stream start failed: {}", e);
                let _ = self.event_tx.send(SessionEvent::StartFailed(e.user_message()));
            }
        }
        true
    }

    fn poll_transport(&mut self) -> bool {
        let mut worked = false;
        while let Some(event) = self.transport.try_event() {
            worked = true;
            match event {
                TransportEvent::Connecting => {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::Connection(ConnectionState::Connecting));
                }
                TransportEvent::Connected => {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::Connection(ConnectionState::Connected));
                }
                TransportEvent::Disconnected => {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::Connection(ConnectionState::Disconnected));
                }
                TransportEvent::Message(message) => self.handle_message(message),
                TransportEvent::Error(e) => {
                    let _ = self.event_tx.send(SessionEvent::Error(e));
                }
            }
        }
        worked
    }

    fn handle_message(&mut self, message: StreamMessage) {
        match message {
            StreamMessage::AudioChunk {
                text,
                audio_data,
                visemes,
                duration_ms,
                ..
            } => self.handle_chunk(text, &audio_data, visemes, duration_ms),
            StreamMessage::Status { status, message } => {
                if status == STATUS_REFILLING {
                    info!("Backend refilling: {}", message);
                    let _ = self.event_tx.send(SessionEvent::Refilling { message });
                } else {
                    debug!("Backend status {}: {}", status, message);
                }
            }
            StreamMessage::Unknown => {}
        }
    }

    fn handle_chunk(&mut self, text: String, audio_data: &str, visemes: Vec<Viseme>, duration_ms: f64) {
        debug!(
            "Chunk: {:.0}ms, {} visemes, caption {:?}",
            duration_ms,
            visemes.len(),
            text
        );
        let _ = self.event_tx.send(SessionEvent::Chunk { text });

        let audio = match self.decode_chunk(audio_data) {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Dropping undecodable chunk: {}", e);
                let _ = self.event_tx.send(SessionEvent::Error(e.user_message()));
                return;
            }
        };

        if let Some(playback) = self.playback.as_mut() {
            match playback.play(audio) {
                Ok(done_rx) => {
                    self.pending_done = Some(done_rx);
                    let _ = self.event_tx.send(SessionEvent::PlaybackStarted);
                }
                Err(e) => {
                    warn!("Playback failed: {}", e);
                    let _ = self.event_tx.send(SessionEvent::Error(e.user_message()));
                    return;
                }
            }
        }

        // The avatar animates even when audio output is unavailable
        self.scheduler.start(visemes, duration_ms);
    }

    fn decode_chunk(&self, audio_data: &str) -> Result<AudioData> {
        let bytes = decode_hex_audio(audio_data)?;
        let samples = pcm16le_to_f32(&bytes)?;
        Ok(AudioData::new(
            samples,
            self.config.sample_rate,
            self.config.channels,
        ))
    }

    fn poll_playback_done(&mut self) -> bool {
        let Some(done_rx) = &self.pending_done else {
            return false;
        };

        match done_rx.try_recv() {
            Ok(PlaybackEnd::Finished) => {
                debug!("Chunk finished playing");
                self.pending_done = None;
                self.scheduler.stop();
                let _ = self.event_tx.send(SessionEvent::PlaybackFinished);
                true
            }
            // A stopped playback was ended by teardown or replacement;
            // whoever ended it already reported the state change.
            Ok(PlaybackEnd::Stopped) | Err(TryRecvError::Disconnected) => {
                self.pending_done = None;
                true
            }
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Stop everything, transport first so no reconnect fires mid-teardown
    fn teardown(&mut self) {
        if let Err(e) = self.transport.close() {
            debug!("Transport already gone: {}", e);
        }
        if let Some(playback) = self.playback.as_mut() {
            playback.stop();
        }
        self.scheduler.stop();
        self.streaming = false;
        self.pending_start = None;
        self.pending_done = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use crate::avatar::{shared_renderer, NullRenderer};
    use crate::net::BackendStatus;
    use std::time::Instant;

    struct MockApi {
        result: std::result::Result<StartStreamResponse, String>,
    }

    impl StreamApi for MockApi {
        fn start_stream(&self, _topic: &str) -> Result<StartStreamResponse> {
            self.result
                .clone()
                .map_err(StreamviewError::ApiError)
        }

        fn fetch_status(&self) -> Result<BackendStatus> {
            Ok(BackendStatus::default())
        }
    }

    fn spawn_session(
        api: MockApi,
    ) -> (SessionHandle, JoinHandle<()>) {
        let config = SessionConfig::default().with_api_base("http://127.0.0.1:9");
        let (session, handle) = StreamSession::new(
            config,
            Arc::new(api),
            Box::new(|| Ok(NullSink::new())),
            shared_renderer(NullRenderer),
        )
        .unwrap();
        let join = session.start().unwrap();
        (handle, join)
    }

    fn wait_for<F: Fn(&SessionEvent) -> bool>(
        handle: &SessionHandle,
        pred: F,
        timeout: Duration,
    ) -> Option<SessionEvent> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(event) = handle.try_event() {
                if pred(&event) {
                    return Some(event);
                }
            } else {
                thread::sleep(Duration::from_millis(5));
            }
        }
        None
    }

    #[test]
    fn reports_audio_and_avatar_status_on_startup() {
        let (handle, join) = spawn_session(MockApi {
            result: Ok(StartStreamResponse::default()),
        });

        assert!(wait_for(
            &handle,
            |e| matches!(e, SessionEvent::AudioReady),
            Duration::from_secs(2)
        )
        .is_some());
        assert!(wait_for(
            &handle,
            |e| matches!(e, SessionEvent::AvatarNotConfigured),
            Duration::from_secs(2)
        )
        .is_some());

        handle.shutdown().unwrap();
        join.join().unwrap();
    }

    #[test]
    fn failed_start_surfaces_start_failed() {
        let (handle, join) = spawn_session(MockApi {
            result: Err("no tts credits".to_string()),
        });

        handle.start_stream("coffee").unwrap();
        let event = wait_for(
            &handle,
            |e| matches!(e, SessionEvent::StartFailed(_)),
            Duration::from_secs(2),
        );
        assert!(event.is_some());

        handle.shutdown().unwrap();
        join.join().unwrap();
    }

    #[test]
    fn accepted_start_emits_start_accepted() {
        let response = StartStreamResponse {
            status: "started".to_string(),
            playlist_size: Some(4),
            ..Default::default()
        };
        let (handle, join) = spawn_session(MockApi {
            result: Ok(response),
        });

        handle.start_stream("tea").unwrap();
        let event = wait_for(
            &handle,
            |e| matches!(e, SessionEvent::StartAccepted(_)),
            Duration::from_secs(2),
        );
        match event {
            Some(SessionEvent::StartAccepted(resp)) => assert_eq!(resp.playlist_size, Some(4)),
            other => panic!("expected StartAccepted, got {:?}", other),
        }

        handle.shutdown().unwrap();
        join.join().unwrap();
    }

    #[test]
    fn stop_without_stream_still_reports_stopped() {
        let (handle, join) = spawn_session(MockApi {
            result: Ok(StartStreamResponse::default()),
        });

        handle.stop_stream().unwrap();
        assert!(wait_for(
            &handle,
            |e| matches!(e, SessionEvent::Stopped),
            Duration::from_secs(2)
        )
        .is_some());

        handle.shutdown().unwrap();
        join.join().unwrap();
    }
}

//! WebSocket transport worker
//!
//! Owns the connection to the backend's stream endpoint on a dedicated
//! thread with its own single-threaded tokio runtime. The session drives it
//! through a `TransportHandle`: commands go in over an async channel, frames
//! and state changes come back as `TransportEvent`s on a crossbeam channel
//! the session polls.
//!
//! Reconnection is gated on the handle's `active` flag. An unexpected close
//! while active triggers a retry after a fixed delay, indefinitely; clearing
//! the flag (done before the close command is sent) stops the cycle, so an
//! intentional close never races a reconnect.

use crate::net::message::StreamMessage;
use crate::{Result, StreamviewError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const COMMAND_QUEUE: usize = 16;

/// Transport configuration
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Full WebSocket endpoint URL
    pub ws_url: String,

    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Short status label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }
}

#[derive(Debug)]
enum TransportCommand {
    Connect,
    Close,
    Shutdown,
}

/// Events surfaced to the session
#[derive(Debug)]
pub enum TransportEvent {
    Connecting,
    Connected,
    Disconnected,
    /// A decoded stream frame
    Message(StreamMessage),
    Error(String),
}

/// What the connection loop should do next
enum Flow {
    Retry,
    Idle,
    Shutdown,
}

/// Session-side handle to the transport worker
#[derive(Clone)]
pub struct TransportHandle {
    active: Arc<AtomicBool>,
    command_tx: mpsc::Sender<TransportCommand>,
    event_rx: Receiver<TransportEvent>,
}

impl TransportHandle {
    /// Open the stream connection and keep it alive across drops
    pub fn connect(&self) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        self.send(TransportCommand::Connect)
    }

    /// Close the stream connection and stop reconnecting.
    ///
    /// The active flag is cleared before the close command is queued so a
    /// reconnect sleeping out its backoff cannot fire afterwards.
    pub fn close(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        self.send(TransportCommand::Close)
    }

    /// Stop the worker entirely
    pub fn shutdown(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        self.send(TransportCommand::Shutdown)
    }

    /// Whether the stream is meant to be up
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Next pending event, if any
    pub fn try_event(&self) -> Option<TransportEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: TransportCommand) -> Result<()> {
        self.command_tx
            .blocking_send(command)
            .map_err(|e| StreamviewError::ChannelError(format!("transport command failed: {}", e)))
    }
}

/// The transport worker before it is started
pub struct Transport {
    config: TransportConfig,
    active: Arc<AtomicBool>,
    command_rx: mpsc::Receiver<TransportCommand>,
    event_tx: Sender<TransportEvent>,
    handle: TransportHandle,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (event_tx, event_rx) = unbounded();
        let active = Arc::new(AtomicBool::new(false));

        let handle = TransportHandle {
            active: Arc::clone(&active),
            command_tx,
            event_rx,
        };

        Self {
            config,
            active,
            command_rx,
            event_tx,
            handle,
        }
    }

    pub fn handle(&self) -> TransportHandle {
        self.handle.clone()
    }

    /// Spawn the worker thread with its own runtime
    pub fn start_worker(self) -> JoinHandle<()> {
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to build transport runtime: {}", e);
                    let _ = self
                        .event_tx
                        .send(TransportEvent::Error(format!("transport runtime: {}", e)));
                    return;
                }
            };

            runtime.block_on(run(
                self.config,
                self.active,
                self.command_rx,
                self.event_tx,
            ));
            debug!("Transport worker stopped");
        })
    }
}

async fn run(
    config: TransportConfig,
    active: Arc<AtomicBool>,
    mut command_rx: mpsc::Receiver<TransportCommand>,
    event_tx: Sender<TransportEvent>,
) {
    loop {
        // Idle until asked to connect
        match command_rx.recv().await {
            Some(TransportCommand::Connect) => {}
            Some(TransportCommand::Close) => continue,
            Some(TransportCommand::Shutdown) | None => return,
        }

        'connection: loop {
            if !active.load(Ordering::SeqCst) {
                break 'connection;
            }

            let _ = event_tx.send(TransportEvent::Connecting);
            info!("Connecting to {}", config.ws_url);

            let ws = match connect_async(config.ws_url.as_str()).await {
                Ok((ws, _response)) => ws,
                Err(e) => {
                    warn!("Connection failed: {}", e);
                    let _ = event_tx.send(TransportEvent::Error(format!("connect: {}", e)));
                    let _ = event_tx.send(TransportEvent::Disconnected);
                    match backoff(config.reconnect_delay, &active, &mut command_rx).await {
                        Flow::Retry => continue 'connection,
                        Flow::Idle => break 'connection,
                        Flow::Shutdown => return,
                    }
                }
            };

            info!("Connected to stream");
            let _ = event_tx.send(TransportEvent::Connected);

            match serve(ws, &mut command_rx, &event_tx).await {
                Flow::Shutdown => return,
                Flow::Idle => {
                    let _ = event_tx.send(TransportEvent::Disconnected);
                    break 'connection;
                }
                Flow::Retry => {
                    let _ = event_tx.send(TransportEvent::Disconnected);
                    match backoff(config.reconnect_delay, &active, &mut command_rx).await {
                        Flow::Retry => continue 'connection,
                        Flow::Idle => break 'connection,
                        Flow::Shutdown => return,
                    }
                }
            }
        }
    }
}

/// Pump one live connection until it closes or a command ends it
async fn serve(
    ws: WsStream,
    command_rx: &mut mpsc::Receiver<TransportCommand>,
    event_tx: &Sender<TransportEvent>,
) -> Flow {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<StreamMessage>(&text) {
                        Ok(StreamMessage::Unknown) => {
                            debug!("Ignoring frame with unknown type");
                        }
                        Ok(message) => {
                            let _ = event_tx.send(TransportEvent::Message(message));
                        }
                        // A malformed frame is dropped, the connection stays up
                        Err(e) => {
                            warn!("Dropping malformed frame: {}", e);
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Server closed the stream");
                    return Flow::Retry;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Stream error: {}", e);
                    let _ = event_tx.send(TransportEvent::Error(format!("stream: {}", e)));
                    return Flow::Retry;
                }
            },
            command = command_rx.recv() => match command {
                Some(TransportCommand::Close) => {
                    let _ = ws_tx.close().await;
                    info!("Stream closed on request");
                    return Flow::Idle;
                }
                Some(TransportCommand::Shutdown) | None => {
                    let _ = ws_tx.close().await;
                    return Flow::Shutdown;
                }
                Some(TransportCommand::Connect) => {
                    debug!("Already connected");
                }
            }
        }
    }
}

/// Wait out the reconnect delay, still honoring commands.
///
/// The active flag is re-checked after the sleep in case the stream was
/// stopped through the handle while waiting.
async fn backoff(
    delay: Duration,
    active: &Arc<AtomicBool>,
    command_rx: &mut mpsc::Receiver<TransportCommand>,
) -> Flow {
    debug!("Reconnecting in {:?}", delay);
    tokio::select! {
        _ = tokio::time::sleep(delay) => {
            if active.load(Ordering::SeqCst) {
                Flow::Retry
            } else {
                Flow::Idle
            }
        }
        command = command_rx.recv() => match command {
            Some(TransportCommand::Connect) => Flow::Retry,
            Some(TransportCommand::Close) => Flow::Idle,
            Some(TransportCommand::Shutdown) | None => Flow::Shutdown,
        }
    }
}

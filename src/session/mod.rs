//! Stream session orchestration
//!
//! Ties the HTTP control plane, the WebSocket transport, audio playback and
//! viseme animation together behind a single command/event interface the UI
//! talks to.

pub mod config;
pub mod stream;

pub use config::SessionConfig;
pub use stream::{SessionEvent, SessionHandle, StreamSession};

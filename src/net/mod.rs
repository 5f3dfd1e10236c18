//! Backend interfaces
//!
//! `api` starts a stream over HTTP, `transport` carries the JSON-framed
//! audio stream over a WebSocket, `message` holds the wire types shared by
//! both.

pub mod api;
pub mod message;
pub mod transport;

pub use api::{HttpStreamApi, StreamApi};
pub use message::{BackendStatus, StartStreamResponse, StreamMessage};
pub use transport::{ConnectionState, Transport, TransportConfig, TransportEvent, TransportHandle};

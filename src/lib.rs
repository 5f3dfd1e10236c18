pub mod audio;
pub mod avatar;
pub mod net;
pub mod session;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StreamviewError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Codec error: {0}")]
    CodecError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Session error: {0}")]
    SessionError(String),
}

impl StreamviewError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            StreamviewError::AudioDeviceError(_) => false,
            // A bad chunk does not invalidate the stream
            StreamviewError::CodecError(_) => true,
            // The transport retries on its own while the session is active
            StreamviewError::TransportError(_) => true,
            StreamviewError::ApiError(_) => true,
            StreamviewError::ConfigError(_) => false,
            StreamviewError::ChannelError(_) => false,
            StreamviewError::SessionError(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            StreamviewError::AudioDeviceError(_) => {
                "Audio device error. Please check your speakers.".to_string()
            }
            StreamviewError::CodecError(_) => {
                "Received a corrupted audio chunk. Waiting for the next one.".to_string()
            }
            StreamviewError::TransportError(_) => {
                "Connection error. Retrying while the stream is active.".to_string()
            }
            StreamviewError::ApiError(_) => {
                "Failed to start the stream. Please check the backend.".to_string()
            }
            StreamviewError::ConfigError(_) => {
                "Configuration error. Please check the server URL.".to_string()
            }
            StreamviewError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            StreamviewError::SessionError(_) => {
                "Session error occurred. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StreamviewError>;

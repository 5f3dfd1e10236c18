//! Wire types for the streaming backend

use crate::avatar::Viseme;
use serde::{Deserialize, Serialize};

/// A JSON frame received on the stream WebSocket.
///
/// Messages are immutable once received, carry no identity beyond arrival
/// order and are discarded after handling. Frames with an unrecognized
/// `type` deserialize to `Unknown` and are dropped by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamMessage {
    /// One audio segment with its lip-sync track
    #[serde(rename = "audio_chunk")]
    AudioChunk {
        text: String,
        /// Hex-encoded raw PCM (16-bit signed LE, mono, 24 kHz)
        audio_data: String,
        #[serde(default)]
        visemes: Vec<Viseme>,
        duration_ms: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// Backend status note, e.g. `refilling` while new content is generated
    #[serde(rename = "status")]
    Status { status: String, message: String },

    #[serde(other)]
    Unknown,
}

/// Backend status value sent while the playlist is being regenerated
pub const STATUS_REFILLING: &str = "refilling";

/// Body of a `POST /api/start_stream` response.
///
/// The backend reports failures both as non-2xx statuses and as HTTP 200
/// bodies with `status: "error"`; `is_error` covers the latter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartStreamResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub scripts_generated: Option<u32>,
    #[serde(default)]
    pub audio_items_created: Option<u32>,
    #[serde(default)]
    pub playlist_size: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StartStreamResponse {
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }

    /// Best available failure description
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "backend reported an error".to_string())
    }
}

/// Body of `GET /api/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub playlist_size: u32,
    #[serde(default)]
    pub current_topic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_chunk() {
        let frame = r#"{
            "type": "audio_chunk",
            "text": "hello viewers",
            "audio_data": "0000ff7f",
            "visemes": [{"offset": 0.0, "coefficients": [0.3, 0.0]}],
            "duration_ms": 125.0,
            "timestamp": "2024-01-01T00:00:00"
        }"#;

        match serde_json::from_str::<StreamMessage>(frame).unwrap() {
            StreamMessage::AudioChunk {
                text,
                audio_data,
                visemes,
                duration_ms,
                timestamp,
            } => {
                assert_eq!(text, "hello viewers");
                assert_eq!(audio_data, "0000ff7f");
                assert_eq!(visemes.len(), 1);
                assert_eq!(visemes[0].coefficients, vec![0.3, 0.0]);
                assert_eq!(duration_ms, 125.0);
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_audio_chunk_without_optional_fields() {
        let frame = r#"{"type":"audio_chunk","text":"t","audio_data":"","duration_ms":0}"#;
        match serde_json::from_str::<StreamMessage>(frame).unwrap() {
            StreamMessage::AudioChunk {
                visemes, timestamp, ..
            } => {
                assert!(visemes.is_empty());
                assert!(timestamp.is_none());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_refilling_status() {
        let frame =
            r#"{"type":"status","status":"refilling","message":"generating new content"}"#;
        match serde_json::from_str::<StreamMessage>(frame).unwrap() {
            StreamMessage::Status { status, message } => {
                assert_eq!(status, STATUS_REFILLING);
                assert_eq!(message, "generating new content");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_maps_to_unknown() {
        let frame = r#"{"type":"heartbeat","at":123}"#;
        assert!(matches!(
            serde_json::from_str::<StreamMessage>(frame).unwrap(),
            StreamMessage::Unknown
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(serde_json::from_str::<StreamMessage>("not json at all").is_err());
    }

    #[test]
    fn start_response_error_body() {
        let body = r#"{"status":"error","error":"no tts credits","message":"Failed to start"}"#;
        let resp: StartStreamResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_error());
        assert_eq!(resp.error_message(), "no tts credits");
    }

    #[test]
    fn start_response_success_body() {
        let body = r#"{
            "status": "started",
            "topic": "coffee makers",
            "scripts_generated": 5,
            "audio_items_created": 5,
            "playlist_size": 5,
            "message": "Stream started. Connect to /ws/stream to receive audio."
        }"#;
        let resp: StartStreamResponse = serde_json::from_str(body).unwrap();
        assert!(!resp.is_error());
        assert_eq!(resp.playlist_size, Some(5));
    }

    #[test]
    fn backend_status_body() {
        let body = r#"{"is_streaming":true,"playlist_size":3,"current_topic":"tea"}"#;
        let status: BackendStatus = serde_json::from_str(body).unwrap();
        assert!(status.is_streaming);
        assert_eq!(status.playlist_size, 3);
        assert_eq!(status.current_topic.as_deref(), Some("tea"));
    }
}

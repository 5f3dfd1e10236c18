//! PCM payload decoding
//!
//! Audio chunks arrive as hex-encoded raw PCM: 16-bit signed little-endian,
//! mono, 24 kHz. Both decoding steps treat malformed input as an error
//! rather than producing garbage samples.

use crate::{Result, StreamviewError};

/// Sample rate of the backend's PCM stream
pub const STREAM_SAMPLE_RATE: u32 = 24000;

/// Channel count of the backend's PCM stream
pub const STREAM_CHANNELS: u16 = 1;

/// Decode a hex-encoded audio payload into raw bytes.
///
/// Odd-length or non-hex input is a precondition violation and returns a
/// codec error.
pub fn decode_hex_audio(payload: &str) -> Result<Vec<u8>> {
    hex::decode(payload.trim())
        .map_err(|e| StreamviewError::CodecError(format!("invalid hex payload: {}", e)))
}

/// Reinterpret raw bytes as little-endian signed 16-bit PCM and normalize
/// each sample to [-1.0, 1.0].
pub fn pcm16le_to_f32(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 2 != 0 {
        return Err(StreamviewError::CodecError(format!(
            "PCM byte length {} is not sample aligned",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

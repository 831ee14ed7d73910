//! # Encoding Model
//!
//! Encode request construction and the local encode fallback.
//!
//! The fallback is a demonstration stand-in, not an erasure code: the payload
//! is the base64 form of the text followed by a separator and one parity
//! marker per ECC symbol. It is only produced when the remote encoder is
//! unreachable.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::errors::{StudioError, ValidationError};

/// Separator between the text segment and the parity markers.
pub const PAYLOAD_SEPARATOR: char = '_';

/// Marker emitted once per parity symbol by the local fallback.
pub const PARITY_MARKER: char = 'P';

/// Request sent to the remote encoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingRequest {
    /// Text to protect.
    pub data: String,
    /// Number of parity symbols to append.
    pub ecc_symbols: u32,
}

/// Encoded artifact and its statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodingResult {
    /// Source length in bytes (UTF-8).
    pub original_length_bytes: usize,
    /// Encoded length in bytes; never below `original_length_bytes`.
    pub encoded_length_bytes: usize,
    /// `encoded_length_bytes - original_length_bytes`.
    pub parity_bytes: usize,
    /// Parity overhead relative to the source, percent, two decimals.
    pub overhead_percentage: f64,
    /// Transport-encoded payload (base64 text).
    pub encoded_payload: String,
}

impl EncodingResult {
    /// Build a result from lengths, deriving parity and overhead.
    ///
    /// Fails with `Decode` when `encoded < original` and with `DivideByZero`
    /// when `original == 0`.
    pub fn from_lengths(
        original_length_bytes: usize,
        encoded_length_bytes: usize,
        encoded_payload: String,
    ) -> Result<Self, StudioError> {
        if encoded_length_bytes < original_length_bytes {
            return Err(StudioError::Decode(format!(
                "encoded length {} is shorter than original length {}",
                encoded_length_bytes, original_length_bytes
            )));
        }
        let parity_bytes = encoded_length_bytes - original_length_bytes;
        let overhead_percentage = overhead_percentage(original_length_bytes, parity_bytes)?;

        Ok(Self {
            original_length_bytes,
            encoded_length_bytes,
            parity_bytes,
            overhead_percentage,
            encoded_payload,
        })
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `parity / original * 100`, two decimals.
pub fn overhead_percentage(original: usize, parity: usize) -> Result<f64, StudioError> {
    if original == 0 {
        return Err(StudioError::DivideByZero("overhead percentage"));
    }
    Ok(round2(parity as f64 / original as f64 * 100.0))
}

/// Build an encode request. Rejects empty text.
pub fn build_encode_request(
    text: &str,
    ecc_symbols: u32,
) -> Result<EncodingRequest, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    Ok(EncodingRequest {
        data: text.to_string(),
        ecc_symbols,
    })
}

/// Approximate an encoded artifact locally.
///
/// Deterministic in every field, payload included.
pub fn local_encode_fallback(text: &str, ecc_symbols: u32) -> Result<EncodingResult, StudioError> {
    let original = text.len();
    let encoded = original + ecc_symbols as usize;

    let mut payload = STANDARD.encode(text.as_bytes());
    payload.push(PAYLOAD_SEPARATOR);
    payload.extend(std::iter::repeat(PARITY_MARKER).take(ecc_symbols as usize));

    EncodingResult::from_lengths(original, encoded, payload)
}

/// Hexadecimal rendering of the leading characters of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HexPreview {
    /// Space-separated lower-case hex pairs.
    pub hex: String,
    /// Number of bytes rendered.
    pub bytes_shown: usize,
    /// Whether the payload was longer than the preview.
    pub truncated: bool,
}

/// Default number of payload characters shown in a hex preview.
pub const HEX_PREVIEW_LIMIT: usize = 50;

/// Render the first `limit` characters of `payload` as hex pairs.
///
/// Payloads are base64 text, so every character is a single byte.
pub fn hex_preview(payload: &str, limit: usize) -> HexPreview {
    let shown: Vec<u8> = payload.bytes().take(limit).collect();
    let hex = shown
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(" ");

    HexPreview {
        hex,
        bytes_shown: shown.len(),
        truncated: payload.len() > limit,
    }
}

//! # Decode Model
//!
//! Decode requests against the remote service and the local reversal of a
//! fallback-encoded payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::encoding::{PARITY_MARKER, PAYLOAD_SEPARATOR};
use super::errors::StudioError;

/// Request sent to the remote decoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Encoded payload (base64 text).
    pub encoded_payload: String,
    /// Parity symbols used when encoding.
    pub ecc_symbols: u32,
    /// Known erasure positions, if any.
    pub erasures: Option<Vec<u64>>,
}

/// Outcome class of a decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStatus {
    /// Payload decoded (possibly after correction).
    Success,
    /// Too many errors for the parity budget.
    Uncorrectable,
}

/// Canonical decode result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeResult {
    /// Outcome class.
    pub status: DecodeStatus,
    /// Recovered text; empty when uncorrectable.
    pub text: String,
    /// Recovered length in bytes.
    pub length_bytes: usize,
    /// Symbols corrected during decoding.
    pub errors_corrected: u64,
    /// Whether any correction was necessary.
    pub was_corrupted: bool,
    /// Number of erasure positions supplied with the request.
    pub erasures_provided: usize,
    /// `floor(ecc_symbols / 2)`.
    pub max_correctable: u64,
}

impl DecodeResult {
    /// Result for a payload beyond the correction capacity.
    pub fn uncorrectable(max_correctable: u64, erasures_provided: usize) -> Self {
        Self {
            status: DecodeStatus::Uncorrectable,
            text: String::new(),
            length_bytes: 0,
            errors_corrected: 0,
            was_corrupted: true,
            erasures_provided,
            max_correctable,
        }
    }
}

/// Build a decode request for a held payload.
pub fn build_decode_request(
    encoded_payload: Option<&str>,
    ecc_symbols: u32,
    erasures: Option<Vec<u64>>,
) -> Result<DecodeRequest, StudioError> {
    let payload = encoded_payload.ok_or(StudioError::NoEncodedData)?;
    Ok(DecodeRequest {
        encoded_payload: payload.to_string(),
        ecc_symbols,
        erasures: erasures.filter(|e| !e.is_empty()),
    })
}

/// Reverse a payload produced by the local encode fallback.
///
/// Only fallback payloads are understood: remote payloads carry real parity
/// and are rejected with `Decode`.
pub fn local_decode_fallback(payload: &str, ecc_symbols: u32) -> Result<DecodeResult, StudioError> {
    let (text_segment, parity) = payload.rsplit_once(PAYLOAD_SEPARATOR).ok_or_else(|| {
        StudioError::Decode("payload has no parity separator; not locally encoded".into())
    })?;

    if !parity.chars().all(|c| c == PARITY_MARKER) {
        return Err(StudioError::Decode(
            "parity segment contains non-marker symbols".into(),
        ));
    }

    let bytes = STANDARD
        .decode(text_segment)
        .map_err(|e| StudioError::Decode(format!("invalid base64 text segment: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| StudioError::Decode(format!("text segment is not UTF-8: {e}")))?;

    Ok(DecodeResult {
        status: DecodeStatus::Success,
        length_bytes: text.len(),
        text,
        errors_corrected: 0,
        was_corrupted: false,
        erasures_provided: 0,
        max_correctable: u64::from(ecc_symbols / 2),
    })
}

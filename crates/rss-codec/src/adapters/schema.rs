//! Wire schemas for the remote codec service.
//!
//! Request bodies differ per [`ApiRevision`]. Responses come in a nested and
//! a flat shape; both are listed in untagged enums with the nested variant
//! first, so a body carrying both shapes resolves to the nested one. The
//! `status` field is inspected before any shape matching.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::{
    success_rate_percent, ApiRevision, DecodeRequest, DecodeResult, DecodeStatus,
    EncodingRequest, EncodingResult, SimulationRequest, SimulationResult, SimulationStatus,
    StudioError,
};
use crate::ports::ServiceHealth;

// =============================================================================
// Request bodies
// =============================================================================

/// Body for the encode endpoint.
pub fn encode_body(request: &EncodingRequest, revision: ApiRevision) -> Value {
    match revision {
        ApiRevision::Current => json!({
            "data": request.data,
            "ecc_symbols": request.ecc_symbols,
        }),
        ApiRevision::Legacy => json!({
            "data": request.data,
            "nsym": request.ecc_symbols,
        }),
    }
}

/// Body for the simulate endpoint. The legacy revision re-encodes raw text.
pub fn simulate_body(request: &SimulationRequest, revision: ApiRevision) -> Value {
    match revision {
        ApiRevision::Current => json!({
            "encoded_data": request.encoded_payload,
            "ecc_symbols": request.ecc_symbols,
            "error_rate": request.error_rate,
            "error_type": request.error_type,
            "channel_type": request.channel_type,
        }),
        ApiRevision::Legacy => json!({
            "data": request.source_text,
            "nsym": request.ecc_symbols,
            "error_rate": request.error_rate,
            "error_type": request.error_type,
            "channel_type": request.channel_type,
        }),
    }
}

/// Body for the decode endpoint. `erasures` is omitted when absent.
pub fn decode_body(request: &DecodeRequest, revision: ApiRevision) -> Value {
    let mut body = match revision {
        ApiRevision::Current => json!({
            "encoded_data": request.encoded_payload,
            "ecc_symbols": request.ecc_symbols,
        }),
        ApiRevision::Legacy => json!({
            "encoded_data": request.encoded_payload,
            "nsym": request.ecc_symbols,
        }),
    };
    if let (Some(erasures), Some(map)) = (&request.erasures, body.as_object_mut()) {
        map.insert("erasures".into(), json!(erasures));
    }
    body
}

// =============================================================================
// Encode responses
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncodeResponse {
    Nested { data: NestedEncodeData },
    Flat(FlatEncode),
}

#[derive(Debug, Deserialize)]
struct NestedEncodeData {
    original: LengthSection,
    encoded: EncodedSection,
}

#[derive(Debug, Deserialize)]
struct LengthSection {
    length_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct EncodedSection {
    base64: String,
    length_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct FlatEncode {
    encoded_data: String,
    original_length: usize,
    encoded_length: usize,
}

// =============================================================================
// Simulate responses
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SimulateResponse {
    Nested(NestedSimulate),
    Flat(FlatSimulate),
}

#[derive(Debug, Deserialize)]
struct NestedSimulate {
    simulation: SimulationSection,
    #[serde(default)]
    error_positions: Option<Vec<u64>>,
    #[serde(default)]
    analysis: Option<AnalysisSection>,
}

#[derive(Debug, Deserialize)]
struct SimulationSection {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    errors_introduced: u64,
    errors_corrected: u64,
    #[serde(default)]
    max_correctable: Option<u64>,
    #[serde(default)]
    success_rate: Option<RateValue>,
}

#[derive(Debug, Deserialize)]
struct AnalysisSection {
    #[serde(default)]
    channel: Option<ChannelSection>,
}

#[derive(Debug, Deserialize)]
struct ChannelSection {
    #[serde(default)]
    error_distribution: Option<ErrorDistribution>,
}

#[derive(Debug, Deserialize)]
struct ErrorDistribution {
    #[serde(default)]
    positions: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct FlatSimulate {
    errors_introduced: u64,
    errors_corrected: u64,
    #[serde(default)]
    max_correctable: Option<u64>,
    #[serde(default)]
    success_rate: Option<RateValue>,
    #[serde(default)]
    error_positions: Vec<u64>,
}

/// Success rate as reported: `80.5`, `"80.50"` or `"80.50%"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    fn percent(&self) -> Result<f64, StudioError> {
        match self {
            RateValue::Number(value) => Ok(*value),
            RateValue::Text(text) => text
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse()
                .map_err(|_| StudioError::Decode(format!("success_rate {text:?} is not a number"))),
        }
    }
}

// =============================================================================
// Decode responses
// =============================================================================

#[derive(Debug, Deserialize)]
struct DecodeSuccess {
    data: DecodeData,
}

#[derive(Debug, Deserialize)]
struct DecodeData {
    decoded: Decoded,
    #[serde(default)]
    correction: Option<Correction>,
}

#[derive(Debug, Deserialize)]
struct Decoded {
    text: String,
    #[serde(default)]
    length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct Correction {
    #[serde(default)]
    errors_corrected: u64,
    #[serde(default)]
    was_corrupted: bool,
    #[serde(default)]
    erasures_provided: usize,
}

#[derive(Debug, Deserialize)]
struct DecodeFailure {
    #[serde(default)]
    error: Option<FailureDetail>,
}

#[derive(Debug, Deserialize)]
struct FailureDetail {
    #[serde(default)]
    max_correctable: Option<u64>,
}

// =============================================================================
// Normalization
// =============================================================================

fn parse_body(body: &str) -> Result<Value, StudioError> {
    serde_json::from_str(body)
        .map_err(|e| StudioError::Decode(format!("response is not JSON: {e}")))
}

fn reported_status(value: &Value) -> Option<&str> {
    value.get("status").and_then(Value::as_str)
}

/// Best-effort message from an error body.
///
/// Looks at `detail.message`, `detail`, `error.message` and `message`.
pub fn error_message(value: &Value) -> Option<String> {
    let candidates = [
        value.pointer("/detail/message"),
        value.get("detail").filter(|d| d.is_string()),
        value.pointer("/error/message"),
        value.get("message"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
}

/// Error for a non-2xx response.
pub fn http_error(status: u16, body: &str) -> StudioError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| error_message(&value))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    StudioError::RemoteError {
        status: Some(status),
        message,
    }
}

fn status_error(value: &Value, status: &str) -> StudioError {
    StudioError::RemoteError {
        status: None,
        message: error_message(value)
            .unwrap_or_else(|| format!("service reported status {status:?}")),
    }
}

/// Normalize an encode response body.
pub fn parse_encode(body: &str) -> Result<EncodingResult, StudioError> {
    let value = parse_body(body)?;
    match reported_status(&value) {
        None | Some("success") => {}
        Some(other) => return Err(status_error(&value, other)),
    }

    let response: EncodeResponse = serde_json::from_value(value)
        .map_err(|_| StudioError::Decode("encode response matched no known schema".into()))?;

    match response {
        EncodeResponse::Nested { data } => EncodingResult::from_lengths(
            data.original.length_bytes,
            data.encoded.length_bytes,
            data.encoded.base64,
        ),
        EncodeResponse::Flat(flat) => EncodingResult::from_lengths(
            flat.original_length,
            flat.encoded_length,
            flat.encoded_data,
        ),
    }
}

/// Normalize a simulate response body.
///
/// `max_correctable` falls back to `floor(ecc / 2)` and the success rate to
/// the corrected share when the service omits them.
pub fn parse_simulate(
    body: &str,
    request: &SimulationRequest,
) -> Result<SimulationResult, StudioError> {
    let value = parse_body(body)?;
    let status = match reported_status(&value) {
        None => None,
        Some(s) => Some(SimulationStatus::parse(s).ok_or_else(|| status_error(&value, s))?),
    };

    let response: SimulateResponse = serde_json::from_value(value)
        .map_err(|_| StudioError::Decode("simulate response matched no known schema".into()))?;

    let (introduced, corrected, max, rate, positions) = match response {
        SimulateResponse::Nested(nested) => {
            let positions = nested
                .error_positions
                .or_else(|| {
                    nested
                        .analysis
                        .and_then(|a| a.channel)
                        .and_then(|c| c.error_distribution)
                        .map(|d| d.positions)
                })
                .unwrap_or_default();
            let summary = nested.simulation.summary;
            (
                summary.errors_introduced,
                summary.errors_corrected,
                summary.max_correctable,
                summary.success_rate,
                positions,
            )
        }
        SimulateResponse::Flat(flat) => (
            flat.errors_introduced,
            flat.errors_corrected,
            flat.max_correctable,
            flat.success_rate,
            flat.error_positions,
        ),
    };

    let corrected = if corrected > introduced {
        warn!(corrected, introduced, "service reported more corrections than errors; clamping");
        introduced
    } else {
        corrected
    };
    let rate = match rate {
        Some(rate) => clamp_rate(rate.percent()?, corrected, introduced),
        None => success_rate_percent(corrected, introduced),
    };
    let status = status.unwrap_or(if corrected >= introduced {
        SimulationStatus::Success
    } else {
        SimulationStatus::Partial
    });

    SimulationResult::from_counts(
        status,
        introduced,
        corrected,
        max.unwrap_or(u64::from(request.ecc_symbols / 2)),
        rate,
        positions,
    )
}

/// Keep a reported success rate within [0, 100]. NaN is recomputed from the counts.
fn clamp_rate(rate: f64, corrected: u64, introduced: u64) -> f64 {
    if (0.0..=100.0).contains(&rate) {
        return rate;
    }
    warn!(rate, "service reported a success rate outside [0, 100]; clamping");
    if rate.is_nan() {
        success_rate_percent(corrected, introduced)
    } else {
        rate.clamp(0.0, 100.0)
    }
}

/// Normalize a decode response body. `uncorrectable` is an outcome, not an error.
pub fn parse_decode(body: &str, request: &DecodeRequest) -> Result<DecodeResult, StudioError> {
    let value = parse_body(body)?;
    let max_default = u64::from(request.ecc_symbols / 2);
    let erasures = request.erasures.as_ref().map_or(0, Vec::len);

    match reported_status(&value) {
        None | Some("success") => {
            let success: DecodeSuccess = serde_json::from_value(value).map_err(|_| {
                StudioError::Decode("decode response matched no known schema".into())
            })?;
            let correction = success.data.correction.unwrap_or_default();
            let text = success.data.decoded.text;
            Ok(DecodeResult {
                status: DecodeStatus::Success,
                length_bytes: success.data.decoded.length.unwrap_or(text.len()),
                text,
                errors_corrected: correction.errors_corrected,
                was_corrupted: correction.was_corrupted,
                erasures_provided: correction.erasures_provided,
                max_correctable: max_default,
            })
        }
        Some("uncorrectable") => {
            let failure: DecodeFailure = serde_json::from_value(value).map_err(|_| {
                StudioError::Decode("uncorrectable response matched no known schema".into())
            })?;
            let max = failure
                .error
                .and_then(|e| e.max_correctable)
                .unwrap_or(max_default);
            Ok(DecodeResult::uncorrectable(max, erasures))
        }
        Some(other) => Err(status_error(&value, other)),
    }
}

/// Normalize a health response body.
pub fn parse_health(body: &str) -> Result<ServiceHealth, StudioError> {
    let value = parse_body(body)?;
    serde_json::from_value(value)
        .map_err(|_| StudioError::Decode("health response matched no known schema".into()))
}

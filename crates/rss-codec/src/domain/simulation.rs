//! # Channel Simulation Model
//!
//! Simulate request construction, the canonical simulation result, and the
//! deterministic local simulate fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::encoding::round2;
use super::errors::{StudioError, ValidationError};

/// Maximum number of placeholder positions reported by the local fallback.
pub const FALLBACK_POSITION_LIMIT: u64 = 10;

/// Noise model requested from the remote service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Independent symbol corruption.
    #[default]
    Random,
    /// Contiguous run of corrupted symbols.
    Burst,
    /// Symbols zeroed out.
    Erasures,
}

impl ErrorType {
    /// All error types, in presentation order.
    pub const ALL: [ErrorType; 3] = [ErrorType::Random, ErrorType::Burst, ErrorType::Erasures];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Random => "random",
            ErrorType::Burst => "burst",
            ErrorType::Erasures => "erasures",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "error type",
                value: s.to_string(),
            })
    }
}

/// Transmission medium requested from the remote service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// Radio link.
    #[default]
    Wireless,
    /// Copper link.
    Wired,
    /// Long-haul satellite link.
    Satellite,
    /// Fibre link.
    Optical,
}

impl ChannelType {
    /// All channel types, in presentation order.
    pub const ALL: [ChannelType; 4] = [
        ChannelType::Wireless,
        ChannelType::Wired,
        ChannelType::Satellite,
        ChannelType::Optical,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Wireless => "wireless",
            ChannelType::Wired => "wired",
            ChannelType::Satellite => "satellite",
            ChannelType::Optical => "optical",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "channel type",
                value: s.to_string(),
            })
    }
}

/// Request sent to the remote channel simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Payload of a prior encoding.
    pub encoded_payload: String,
    /// Text the payload was produced from.
    pub source_text: String,
    /// Parity symbols used when encoding.
    pub ecc_symbols: u32,
    /// Fraction of symbols to corrupt, in [0, 1].
    pub error_rate: f64,
    /// Noise model.
    pub error_type: ErrorType,
    /// Transmission medium.
    pub channel_type: ChannelType,
}

/// Outcome class of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Every introduced error was corrected.
    Success,
    /// Some errors remain.
    Partial,
    /// Decoding failed outright.
    Failure,
}

impl SimulationStatus {
    /// Parse a status string reported by the remote service.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "partial" => Some(Self::Partial),
            "failure" | "failed" => Some(Self::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Partial => f.write_str("partial"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

/// Canonical simulation result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Outcome class.
    pub status: SimulationStatus,
    /// Corrupted symbols.
    pub errors_introduced: u64,
    /// Corrected symbols, never above `errors_introduced`.
    pub errors_corrected: u64,
    /// `errors_introduced - errors_corrected`.
    pub errors_remaining: u64,
    /// `floor(ecc_symbols / 2)`.
    pub max_correctable: u64,
    /// Corrected share, percent in [0, 100].
    pub success_rate_percent: f64,
    /// Distinct corrupted indices, in reported order.
    pub error_positions: Vec<u64>,
    /// `errors_corrected >= errors_introduced`.
    pub was_successful: bool,
}

impl SimulationResult {
    /// Build a result from reported counts, enforcing the result invariants.
    pub fn from_counts(
        status: SimulationStatus,
        errors_introduced: u64,
        errors_corrected: u64,
        max_correctable: u64,
        success_rate_percent: f64,
        error_positions: Vec<u64>,
    ) -> Result<Self, StudioError> {
        if errors_corrected > errors_introduced {
            return Err(StudioError::Decode(format!(
                "errors_corrected {} exceeds errors_introduced {}",
                errors_corrected, errors_introduced
            )));
        }
        if !success_rate_percent.is_finite() || !(0.0..=100.0).contains(&success_rate_percent) {
            return Err(StudioError::Decode(format!(
                "success rate {} outside [0, 100]",
                success_rate_percent
            )));
        }

        let mut distinct = Vec::with_capacity(error_positions.len());
        for position in error_positions {
            if !distinct.contains(&position) {
                distinct.push(position);
            }
        }

        Ok(Self {
            status,
            errors_introduced,
            errors_corrected,
            errors_remaining: errors_introduced - errors_corrected,
            max_correctable,
            success_rate_percent: round2(success_rate_percent),
            error_positions: distinct,
            was_successful: errors_corrected >= errors_introduced,
        })
    }
}

/// Validate an error rate.
pub fn validate_error_rate(error_rate: f64) -> Result<f64, ValidationError> {
    if !error_rate.is_finite() || !(0.0..=1.0).contains(&error_rate) {
        return Err(ValidationError::ErrorRateOutOfRange(error_rate));
    }
    Ok(error_rate)
}

/// Build a simulate request from the current encoded payload.
///
/// `encoded` is `(payload, source_text)` of the held artifact, if any.
pub fn build_simulate_request(
    encoded: Option<(&str, &str)>,
    ecc_symbols: u32,
    error_rate: f64,
    error_type: ErrorType,
    channel_type: ChannelType,
) -> Result<SimulationRequest, StudioError> {
    let (payload, source_text) = encoded.ok_or(StudioError::NoEncodedData)?;
    let error_rate = validate_error_rate(error_rate)?;

    Ok(SimulationRequest {
        encoded_payload: payload.to_string(),
        source_text: source_text.to_string(),
        ecc_symbols,
        error_rate,
        error_type,
        channel_type,
    })
}

/// Share of introduced errors that were corrected, percent.
///
/// Zero introduced errors reads as full success.
pub fn success_rate_percent(errors_corrected: u64, errors_introduced: u64) -> f64 {
    if errors_introduced == 0 {
        return 100.0;
    }
    round2(errors_corrected as f64 / errors_introduced as f64 * 100.0)
}

/// Added before flooring `len × rate` so that rates without an exact binary
/// form (0.29 × 100 is 28.999999999999996) count the intended number of
/// errors. Products within this distance below an integer round up to it.
pub const ERROR_COUNT_TOLERANCE: f64 = 1e-9;

/// Approximate a channel simulation locally. No randomness.
///
/// `errors_introduced = floor(len × rate + ERROR_COUNT_TOLERANCE)`.
pub fn local_simulate_fallback(
    original_text: &str,
    ecc_symbols: u32,
    error_rate: f64,
) -> Result<SimulationResult, StudioError> {
    let error_rate = validate_error_rate(error_rate)?;

    let errors_introduced =
        (original_text.len() as f64 * error_rate + ERROR_COUNT_TOLERANCE).floor() as u64;
    let max_correctable = u64::from(ecc_symbols / 2);
    let errors_corrected = errors_introduced.min(max_correctable);

    let status = if errors_corrected >= errors_introduced {
        SimulationStatus::Success
    } else {
        SimulationStatus::Partial
    };

    let positions = (0..errors_introduced.min(FALLBACK_POSITION_LIMIT))
        .map(|i| i * 2)
        .collect();

    SimulationResult::from_counts(
        status,
        errors_introduced,
        errors_corrected,
        max_correctable,
        success_rate_percent(errors_corrected, errors_introduced),
        positions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_partial_correction() {
        let text = "a".repeat(20);
        let result = local_simulate_fallback(&text, 10, 0.5).unwrap();
        assert_eq!(result.errors_introduced, 10);
        assert_eq!(result.max_correctable, 5);
        assert_eq!(result.errors_corrected, 5);
        assert_eq!(result.errors_remaining, 5);
        assert_eq!(result.status, SimulationStatus::Partial);
        assert_eq!(result.success_rate_percent, 50.00);
        assert!(!result.was_successful);
        assert_eq!(result.error_positions, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[test]
    fn test_fallback_full_correction() {
        let text = "a".repeat(20);
        let result = local_simulate_fallback(&text, 10, 0.2).unwrap();
        assert_eq!(result.errors_introduced, 4);
        assert_eq!(result.max_correctable, 5);
        assert_eq!(result.errors_corrected, 4);
        assert_eq!(result.status, SimulationStatus::Success);
        assert_eq!(result.success_rate_percent, 100.00);
        assert!(result.was_successful);
        assert_eq!(result.error_positions, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_fallback_zero_rate_reads_as_full_success() {
        let result = local_simulate_fallback("some text", 10, 0.0).unwrap();
        assert_eq!(result.errors_introduced, 0);
        assert_eq!(result.errors_corrected, 0);
        assert_eq!(result.success_rate_percent, 100.0);
        assert_eq!(result.status, SimulationStatus::Success);
        assert!(result.was_successful);
        assert!(result.error_positions.is_empty());
    }

    #[test]
    fn test_fallback_positions_capped_at_ten() {
        let text = "x".repeat(100);
        let result = local_simulate_fallback(&text, 0, 1.0).unwrap();
        assert_eq!(result.errors_introduced, 100);
        assert_eq!(result.errors_corrected, 0);
        assert_eq!(result.success_rate_percent, 0.0);
        assert_eq!(result.error_positions.len(), 10);
        assert_eq!(result.error_positions.last(), Some(&18));
    }

    #[test]
    fn test_fallback_rate_representation_error() {
        let text = "x".repeat(100);
        let result = local_simulate_fallback(&text, 100, 0.29).unwrap();
        assert_eq!(result.errors_introduced, 29);
    }

    #[test]
    fn test_fallback_odd_ecc_floors_capacity() {
        let result = local_simulate_fallback(&"x".repeat(10), 7, 0.5).unwrap();
        assert_eq!(result.max_correctable, 3);
        assert_eq!(result.errors_corrected, 3);
        assert_eq!(result.success_rate_percent, 60.0);
    }

    #[test]
    fn test_build_simulate_request_requires_encoding() {
        let err = build_simulate_request(None, 10, 0.1, ErrorType::Random, ChannelType::Wireless)
            .unwrap_err();
        assert!(matches!(err, StudioError::NoEncodedData));
    }

    #[test]
    fn test_build_simulate_request_rejects_bad_rate() {
        for rate in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = build_simulate_request(
                Some(("SEVMTE8=_PP", "HELLO")),
                2,
                rate,
                ErrorType::Burst,
                ChannelType::Wired,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                StudioError::Validation(ValidationError::ErrorRateOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_build_simulate_request_passes_parameters_through() {
        let request = build_simulate_request(
            Some(("SEVMTE8=_PP", "HELLO")),
            2,
            0.25,
            ErrorType::Erasures,
            ChannelType::Satellite,
        )
        .unwrap();
        assert_eq!(request.encoded_payload, "SEVMTE8=_PP");
        assert_eq!(request.source_text, "HELLO");
        assert_eq!(request.error_type, ErrorType::Erasures);
        assert_eq!(request.channel_type, ChannelType::Satellite);
    }

    #[test]
    fn test_error_count_tolerance() {
        let count = |len: usize, rate: f64| {
            local_simulate_fallback(&"x".repeat(len), 10, rate)
                .unwrap()
                .errors_introduced
        };
        // 100 × 0.29 is 28.999999999999996 in binary floating point.
        assert_eq!(count(100, 0.29), 29);
        // Within the tolerance below a boundary rounds up.
        assert_eq!(count(10, 0.29999999995), 3);
        // Further below than the tolerance floors as usual.
        assert_eq!(count(10, 0.2999999), 2);
    }

    #[test]
    fn test_from_counts_rejects_overcorrection() {
        let err = SimulationResult::from_counts(SimulationStatus::Success, 2, 3, 5, 100.0, vec![])
            .unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
    }

    #[test]
    fn test_from_counts_dedups_positions() {
        let result = SimulationResult::from_counts(
            SimulationStatus::Partial,
            4,
            2,
            2,
            50.0,
            vec![3, 1, 3, 7, 1],
        )
        .unwrap();
        assert_eq!(result.error_positions, vec![3, 1, 7]);
    }

    #[test]
    fn test_enum_names_round_trip_through_from_str() {
        for t in ErrorType::ALL {
            assert_eq!(t.as_str().parse::<ErrorType>().unwrap(), t);
        }
        for c in ChannelType::ALL {
            assert_eq!(c.as_str().parse::<ChannelType>().unwrap(), c);
        }
        assert!("Burst".parse::<ErrorType>().is_ok());
        assert!("laser".parse::<ChannelType>().is_err());
    }
}

//! # Session State
//!
//! The single owner of the current theme, encoded artifact and simulation
//! record. Every encode or simulate replaces the prior result wholesale.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::encoding::EncodingResult;
use super::errors::ValidationError;
use super::simulation::{ChannelType, ErrorType, SimulationResult};

/// Display theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ValidationError::UnknownVariant {
                kind: "theme",
                value: s.to_string(),
            }),
        }
    }
}

/// Where a held result came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultOrigin {
    /// Produced by the remote codec service.
    Remote,
    /// Approximated locally because the service was unreachable.
    LocalFallback {
        /// Why the remote call could not complete.
        reason: String,
    },
}

impl ResultOrigin {
    /// Whether the result is a local approximation.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ResultOrigin::LocalFallback { .. })
    }
}

/// The current encoded artifact.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedArtifact {
    /// Text that was encoded (trimmed).
    pub source_text: String,
    /// Parity symbols requested.
    pub ecc_symbols: u32,
    /// Encoding statistics and payload.
    pub result: EncodingResult,
    /// Remote or fallback.
    pub origin: ResultOrigin,
    /// When the artifact was produced.
    pub created_at: DateTime<Utc>,
}

/// Parameters a simulation ran with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Parity symbols.
    pub ecc_symbols: u32,
    /// Requested error rate.
    pub error_rate: f64,
    /// Noise model.
    pub error_type: ErrorType,
    /// Transmission medium.
    pub channel_type: ChannelType,
}

/// The current simulation result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationRecord {
    /// Parameters used.
    pub parameters: SimulationParameters,
    /// Normalized outcome.
    pub result: SimulationResult,
    /// Remote or fallback.
    pub origin: ResultOrigin,
    /// When the simulation completed.
    pub created_at: DateTime<Utc>,
}

/// Session state for one studio instance.
#[derive(Clone, Debug, Default)]
pub struct Session {
    theme: Theme,
    encoded: Option<EncodedArtifact>,
    simulation: Option<SimulationRecord>,
}

impl Session {
    /// Create an empty session with the given theme.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            encoded: None,
            simulation: None,
        }
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Set the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Current encoded artifact.
    pub fn encoded(&self) -> Option<&EncodedArtifact> {
        self.encoded.as_ref()
    }

    /// Current simulation record.
    pub fn simulation(&self) -> Option<&SimulationRecord> {
        self.simulation.as_ref()
    }

    /// Replace the encoded artifact.
    ///
    /// A simulation record describes the previous artifact, so it is dropped.
    pub fn replace_encoded(&mut self, artifact: EncodedArtifact) {
        self.encoded = Some(artifact);
        self.simulation = None;
    }

    /// Replace the simulation record.
    pub fn replace_simulation(&mut self, record: SimulationRecord) {
        self.simulation = Some(record);
    }

    /// Drop both results; the theme is kept.
    pub fn clear(&mut self) {
        self.encoded = None;
        self.simulation = None;
    }
}

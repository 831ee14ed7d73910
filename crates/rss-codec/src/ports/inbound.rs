//! # Inbound Ports
//!
//! API trait defining what the studio can do.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use super::outbound::ServiceHealth;
use crate::domain::{
    DecodeResult, EncodedArtifact, HexPreview, ResultOrigin, Session, SimulationParameters,
    SimulationRecord, StudioError, Theme,
};

/// Decode outcome together with where it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodeOutcome {
    /// Normalized decode result.
    pub result: DecodeResult,
    /// Remote or fallback.
    pub origin: ResultOrigin,
}

/// Studio API - inbound port.
#[async_trait]
pub trait StudioApi: Send + Sync {
    /// Encode `text` (trimmed) with `ecc_symbols` parity symbols and make it
    /// the current artifact.
    async fn handle_encode(
        &self,
        text: &str,
        ecc_symbols: u32,
    ) -> Result<EncodedArtifact, StudioError>;

    /// Simulate transmission of the current artifact.
    async fn handle_simulate(
        &self,
        parameters: SimulationParameters,
    ) -> Result<SimulationRecord, StudioError>;

    /// Decode the current artifact.
    async fn handle_decode(&self, erasures: Option<Vec<u64>>)
        -> Result<DecodeOutcome, StudioError>;

    /// Probe the remote service.
    async fn check_health(&self) -> Result<ServiceHealth, StudioError>;

    /// Hex preview of the current payload.
    fn hex_preview(&self) -> Option<HexPreview>;

    /// Drop the current artifact and simulation.
    fn clear(&self);

    /// Write the current simulation record into `dir`.
    fn export(&self, dir: &Path) -> Result<PathBuf, StudioError>;

    /// Current theme.
    fn theme(&self) -> Theme;

    /// Set and persist the theme.
    fn set_theme(&self, theme: Theme) -> Result<Theme, StudioError>;

    /// Flip and persist the theme.
    fn toggle_theme(&self) -> Result<Theme, StudioError>;

    /// Copy of the session state.
    fn snapshot(&self) -> Session;
}

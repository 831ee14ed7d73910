//! # Simulation Export
//!
//! Serializes the current simulation record, with a timestamp and system
//! metadata, to `reed-solomon-simulation-<epoch-millis>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::StudioError;
use super::session::{ResultOrigin, SimulationParameters, SimulationRecord};
use super::simulation::SimulationResult;

/// System name recorded in every export.
pub const SYSTEM_NAME: &str = "Reed-Solomon Error Correction System";

/// Exported document.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationExport<'a> {
    /// Export time, RFC 3339.
    pub timestamp: String,
    /// System name.
    pub system: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Remote or fallback.
    pub origin: &'a ResultOrigin,
    /// Parameters the simulation ran with.
    pub parameters: &'a SimulationParameters,
    /// When the simulation completed, RFC 3339.
    pub simulated_at: String,
    /// Outcome fields, inlined.
    #[serde(flatten)]
    pub result: &'a SimulationResult,
}

impl<'a> SimulationExport<'a> {
    /// Build an export document for `record` stamped at `now`.
    pub fn new(record: &'a SimulationRecord, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339(),
            system: SYSTEM_NAME,
            version: env!("CARGO_PKG_VERSION"),
            origin: &record.origin,
            parameters: &record.parameters,
            simulated_at: record.created_at.to_rfc3339(),
            result: &record.result,
        }
    }
}

/// File name for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("reed-solomon-simulation-{}.json", now.timestamp_millis())
}

/// Write `record` as pretty JSON into `dir`, returning the file path.
pub fn write_export(
    dir: &Path,
    record: &SimulationRecord,
    now: DateTime<Utc>,
) -> Result<PathBuf, StudioError> {
    let document = SimulationExport::new(record, now);
    let json = serde_json::to_string_pretty(&document)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulation::{local_simulate_fallback, ChannelType, ErrorType};
    use chrono::TimeZone;

    fn record() -> SimulationRecord {
        SimulationRecord {
            parameters: SimulationParameters {
                ecc_symbols: 10,
                error_rate: 0.5,
                error_type: ErrorType::Burst,
                channel_type: ChannelType::Wired,
            },
            result: local_simulate_fallback(&"a".repeat(20), 10, 0.5).unwrap(),
            origin: ResultOrigin::LocalFallback {
                reason: "timed out".into(),
            },
            created_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_file_name_uses_epoch_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        assert_eq!(
            export_file_name(now),
            "reed-solomon-simulation-1700000123456.json"
        );
    }

    #[test]
    fn test_write_export_contents() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        let path = write_export(dir.path(), &record(), now).unwrap();

        assert!(path.ends_with("reed-solomon-simulation-1700000123456.json"));
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["system"], SYSTEM_NAME);
        assert_eq!(value["status"], "partial");
        assert_eq!(value["errors_introduced"], 10);
        assert_eq!(value["errors_corrected"], 5);
        assert_eq!(value["success_rate_percent"], 50.0);
        assert_eq!(value["origin"]["kind"], "local_fallback");
        assert_eq!(value["parameters"]["error_type"], "burst");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2023-11-14"));
    }
}

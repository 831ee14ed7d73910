//! # Outbound Ports
//!
//! Traits for external dependencies (remote codec service, preference storage).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    local_encode_fallback, local_simulate_fallback, DecodeRequest, DecodeResult, DecodeStatus,
    EncodingRequest, EncodingResult, SimulationRequest, SimulationResult, StudioError, Theme,
};

/// Remote codec service - outbound port.
///
/// Implementations map transport failures (connect, DNS, timeout) to
/// `RemoteUnavailable` and service-reported failures to `RemoteError`.
#[async_trait]
pub trait CodecService: Send + Sync {
    /// Encode text with parity symbols.
    async fn encode(&self, request: &EncodingRequest) -> Result<EncodingResult, StudioError>;

    /// Simulate transmission of an encoded payload over a noisy channel.
    async fn simulate(&self, request: &SimulationRequest)
        -> Result<SimulationResult, StudioError>;

    /// Decode (and correct) an encoded payload.
    async fn decode(&self, request: &DecodeRequest) -> Result<DecodeResult, StudioError>;

    /// Probe service health.
    async fn health(&self) -> Result<ServiceHealth, StudioError>;
}

/// Health report from the codec service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Reported status, e.g. `healthy`.
    pub status: String,
    /// Service name.
    #[serde(default)]
    pub service: Option<String>,
    /// Service version.
    #[serde(default)]
    pub version: Option<String>,
    /// Service clock at response time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ServiceHealth {
    /// Whether the service reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// Persisted preference storage - outbound port.
pub trait PreferenceStore: Send + Sync {
    /// Load the stored theme, if any.
    fn load_theme(&self) -> Result<Option<Theme>, StudioError>;

    /// Persist the theme.
    fn save_theme(&self, theme: Theme) -> Result<(), StudioError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// How the mock codec service answers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MockBehavior {
    /// Answer with locally computed results.
    #[default]
    Succeed,
    /// Fail as if the network call could not complete.
    Unavailable,
    /// Fail as if the service reported an error.
    Reject(String),
    /// Never answer.
    Hang,
}

/// Mock codec service for testing.
#[derive(Default)]
pub struct MockCodecService {
    /// Behavior for every call.
    pub behavior: MockBehavior,
    encode_calls: AtomicUsize,
    simulate_calls: AtomicUsize,
    decode_calls: AtomicUsize,
}

impl MockCodecService {
    /// Mock with the given behavior.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    /// Number of encode calls received.
    pub fn encode_calls(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    /// Number of simulate calls received.
    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    /// Number of decode calls received.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }

    async fn fail(&self) -> Result<(), StudioError> {
        match &self.behavior {
            MockBehavior::Succeed => Ok(()),
            MockBehavior::Unavailable => {
                Err(StudioError::RemoteUnavailable("mock connection refused".into()))
            }
            MockBehavior::Reject(message) => Err(StudioError::RemoteError {
                status: Some(400),
                message: message.clone(),
            }),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl CodecService for MockCodecService {
    async fn encode(&self, request: &EncodingRequest) -> Result<EncodingResult, StudioError> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        self.fail().await?;
        // Distinguishable from the fallback payload: no separator
        let mut result = local_encode_fallback(&request.data, request.ecc_symbols)?;
        result.encoded_payload = format!("remote:{}", request.data);
        Ok(result)
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, StudioError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        self.fail().await?;
        local_simulate_fallback(&request.source_text, request.ecc_symbols, request.error_rate)
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<DecodeResult, StudioError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        self.fail().await?;
        let text = request
            .encoded_payload
            .strip_prefix("remote:")
            .unwrap_or(&request.encoded_payload)
            .to_string();
        Ok(DecodeResult {
            status: DecodeStatus::Success,
            length_bytes: text.len(),
            text,
            errors_corrected: 0,
            was_corrupted: false,
            erasures_provided: request.erasures.as_ref().map_or(0, Vec::len),
            max_correctable: u64::from(request.ecc_symbols / 2),
        })
    }

    async fn health(&self) -> Result<ServiceHealth, StudioError> {
        self.fail().await?;
        Ok(ServiceHealth {
            status: "healthy".into(),
            service: Some("mock-codec".into()),
            version: None,
            timestamp: None,
        })
    }
}

/// In-memory preference store for testing.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    theme: Mutex<Option<Theme>>,
}

impl MemoryPreferenceStore {
    /// Store pre-seeded with a theme.
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(Some(theme)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_theme(&self) -> Result<Option<Theme>, StudioError> {
        Ok(*self.theme.lock())
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StudioError> {
        *self.theme.lock() = Some(theme);
        Ok(())
    }
}

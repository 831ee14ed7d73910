//! # Studio Service
//!
//! Session controller. Every remote call is raced against the configured
//! request timeout; only `RemoteUnavailable` routes onto a local fallback.
//! The session lock is never held across an `.await`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    build_decode_request, build_encode_request, build_simulate_request, hex_preview,
    local_decode_fallback, local_encode_fallback, local_simulate_fallback, write_export,
    EncodedArtifact, HexPreview, Operation, ResultOrigin, Session, SimulationParameters,
    SimulationRecord, StudioConfig, StudioError, Theme, ValidationError, HEX_PREVIEW_LIMIT,
};
use crate::ports::{CodecService, DecodeOutcome, PreferenceStore, ServiceHealth, StudioApi};

/// Counters for completed operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Encodes that replaced the artifact.
    pub encodes: u64,
    /// Simulations that completed.
    pub simulations: u64,
    /// Decodes that completed.
    pub decodes: u64,
    /// Operations answered by a local fallback.
    pub fallbacks: u64,
    /// Operations the remote service rejected.
    pub remote_errors: u64,
}

/// Releases an in-flight flag on drop.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, operation: Operation) -> Result<Self, StudioError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StudioError::Busy(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Studio service, generic over its codec transport and preference store.
pub struct StudioService<C: CodecService, P: PreferenceStore> {
    codec: Arc<C>,
    preferences: Arc<P>,
    config: StudioConfig,
    session: Mutex<Session>,
    stats: Mutex<ServiceStats>,
    encode_in_flight: AtomicBool,
    simulate_in_flight: AtomicBool,
}

impl<C: CodecService, P: PreferenceStore> StudioService<C, P> {
    /// Create a service. The session starts empty with the persisted theme.
    pub fn new(
        codec: Arc<C>,
        preferences: Arc<P>,
        config: StudioConfig,
    ) -> Result<Self, StudioError> {
        config.validate()?;

        let theme = preferences.load_theme().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load preferences; using default theme");
            None
        });

        Ok(Self {
            codec,
            preferences,
            config,
            session: Mutex::new(Session::new(theme.unwrap_or_default())),
            stats: Mutex::new(ServiceStats::default()),
            encode_in_flight: AtomicBool::new(false),
            simulate_in_flight: AtomicBool::new(false),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Counters since creation.
    pub fn stats(&self) -> ServiceStats {
        *self.stats.lock()
    }

    /// Race `call` against the request timeout. Expiry drops the call.
    async fn race<T, F>(&self, operation: &str, call: F) -> Result<T, StudioError>
    where
        F: Future<Output = Result<T, StudioError>>,
    {
        let limit = self.config.timeouts.request;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StudioError::RemoteUnavailable(format!(
                "{operation} timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }

    fn check_ecc(&self, ecc_symbols: u32) -> Result<(), ValidationError> {
        if ecc_symbols > self.config.max_ecc_symbols {
            return Err(ValidationError::EccSymbolsOutOfRange {
                value: ecc_symbols,
                max: self.config.max_ecc_symbols,
            });
        }
        Ok(())
    }

    fn record_fallback(&self) {
        self.stats.lock().fallbacks += 1;
    }

    fn record_remote_error(&self) {
        self.stats.lock().remote_errors += 1;
    }
}

#[async_trait]
impl<C, P> StudioApi for StudioService<C, P>
where
    C: CodecService + 'static,
    P: PreferenceStore + 'static,
{
    #[instrument(skip(self, text), fields(correlation_id = %Uuid::new_v4()))]
    async fn handle_encode(
        &self,
        text: &str,
        ecc_symbols: u32,
    ) -> Result<EncodedArtifact, StudioError> {
        let text = text.trim();
        self.check_ecc(ecc_symbols)?;
        let request = build_encode_request(text, ecc_symbols)?;

        let _guard = InFlight::acquire(&self.encode_in_flight, Operation::Encode)?;
        debug!(bytes = text.len(), "dispatching encode");

        let (result, origin) = match self.race("encode", self.codec.encode(&request)).await {
            Ok(result) => (result, ResultOrigin::Remote),
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "codec service unavailable; encoding locally");
                self.record_fallback();
                (
                    local_encode_fallback(text, ecc_symbols)?,
                    ResultOrigin::LocalFallback {
                        reason: e.to_string(),
                    },
                )
            }
            Err(e) => {
                warn!(error = %e, "encode rejected");
                self.record_remote_error();
                return Err(e);
            }
        };

        let artifact = EncodedArtifact {
            source_text: text.to_string(),
            ecc_symbols,
            result,
            origin,
            created_at: Utc::now(),
        };
        self.session.lock().replace_encoded(artifact.clone());
        self.stats.lock().encodes += 1;

        info!(
            encoded_bytes = artifact.result.encoded_length_bytes,
            overhead = artifact.result.overhead_percentage,
            fallback = artifact.origin.is_fallback(),
            "encode complete"
        );
        Ok(artifact)
    }

    #[instrument(skip(self), fields(correlation_id = %Uuid::new_v4()))]
    async fn handle_simulate(
        &self,
        parameters: SimulationParameters,
    ) -> Result<SimulationRecord, StudioError> {
        self.check_ecc(parameters.ecc_symbols)?;

        let artifact = self.session.lock().encoded().cloned();
        let request = build_simulate_request(
            artifact
                .as_ref()
                .map(|a| (a.result.encoded_payload.as_str(), a.source_text.as_str())),
            parameters.ecc_symbols,
            parameters.error_rate,
            parameters.error_type,
            parameters.channel_type,
        )?;

        let _guard = InFlight::acquire(&self.simulate_in_flight, Operation::Simulate)?;
        debug!(rate = request.error_rate, "dispatching simulate");

        let (result, origin) = match self.race("simulate", self.codec.simulate(&request)).await {
            Ok(result) => (result, ResultOrigin::Remote),
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "codec service unavailable; simulating locally");
                self.record_fallback();
                (
                    local_simulate_fallback(
                        &request.source_text,
                        request.ecc_symbols,
                        request.error_rate,
                    )?,
                    ResultOrigin::LocalFallback {
                        reason: e.to_string(),
                    },
                )
            }
            Err(e) => {
                warn!(error = %e, "simulate rejected");
                self.record_remote_error();
                return Err(e);
            }
        };

        let record = SimulationRecord {
            parameters,
            result,
            origin,
            created_at: Utc::now(),
        };

        {
            let mut session = self.session.lock();
            // An encode that landed meanwhile owns the session now.
            let unchanged = match (session.encoded(), artifact.as_ref()) {
                (Some(current), Some(used)) => current.created_at == used.created_at,
                _ => false,
            };
            if unchanged {
                session.replace_simulation(record.clone());
            } else {
                info!("artifact replaced during simulation; result not retained");
            }
        }
        self.stats.lock().simulations += 1;

        info!(
            status = %record.result.status,
            introduced = record.result.errors_introduced,
            corrected = record.result.errors_corrected,
            fallback = record.origin.is_fallback(),
            "simulation complete"
        );
        Ok(record)
    }

    #[instrument(skip(self), fields(correlation_id = %Uuid::new_v4()))]
    async fn handle_decode(
        &self,
        erasures: Option<Vec<u64>>,
    ) -> Result<DecodeOutcome, StudioError> {
        let artifact = self.session.lock().encoded().cloned();
        let ecc_symbols = artifact.as_ref().map_or(0, |a| a.ecc_symbols);
        let request = build_decode_request(
            artifact.as_ref().map(|a| a.result.encoded_payload.as_str()),
            ecc_symbols,
            erasures,
        )?;

        debug!("dispatching decode");
        let outcome = match self.race("decode", self.codec.decode(&request)).await {
            Ok(result) => DecodeOutcome {
                result,
                origin: ResultOrigin::Remote,
            },
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "codec service unavailable; decoding locally");
                self.record_fallback();
                DecodeOutcome {
                    result: local_decode_fallback(&request.encoded_payload, ecc_symbols)?,
                    origin: ResultOrigin::LocalFallback {
                        reason: e.to_string(),
                    },
                }
            }
            Err(e) => {
                warn!(error = %e, "decode rejected");
                self.record_remote_error();
                return Err(e);
            }
        };
        self.stats.lock().decodes += 1;

        info!(status = ?outcome.result.status, "decode complete");
        Ok(outcome)
    }

    async fn check_health(&self) -> Result<ServiceHealth, StudioError> {
        let health = self.race("health", self.codec.health()).await?;
        debug!(status = %health.status, "health probe answered");
        Ok(health)
    }

    fn hex_preview(&self) -> Option<HexPreview> {
        self.session
            .lock()
            .encoded()
            .map(|a| hex_preview(&a.result.encoded_payload, HEX_PREVIEW_LIMIT))
    }

    fn clear(&self) {
        self.session.lock().clear();
        debug!("session cleared");
    }

    fn export(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        let record = self
            .session
            .lock()
            .simulation()
            .cloned()
            .ok_or(StudioError::NothingToExport)?;

        let path = write_export(dir, &record, Utc::now())?;
        info!(path = %path.display(), "simulation exported");
        Ok(path)
    }

    fn theme(&self) -> Theme {
        self.session.lock().theme()
    }

    fn set_theme(&self, theme: Theme) -> Result<Theme, StudioError> {
        self.preferences.save_theme(theme)?;
        self.session.lock().set_theme(theme);
        Ok(theme)
    }

    fn toggle_theme(&self) -> Result<Theme, StudioError> {
        let next = self.theme().toggled();
        self.set_theme(next)
    }

    fn snapshot(&self) -> Session {
        self.session.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelType, ErrorType, SimulationStatus};
    use crate::ports::{MemoryPreferenceStore, MockBehavior, MockCodecService};
    use std::time::Duration;

    type TestService = StudioService<MockCodecService, MemoryPreferenceStore>;

    fn service(behavior: MockBehavior) -> TestService {
        let mut config = StudioConfig::default();
        config.timeouts.request = Duration::from_millis(50);
        StudioService::new(
            Arc::new(MockCodecService::with_behavior(behavior)),
            Arc::new(MemoryPreferenceStore::default()),
            config,
        )
        .unwrap()
    }

    fn params(ecc_symbols: u32, error_rate: f64) -> SimulationParameters {
        SimulationParameters {
            ecc_symbols,
            error_rate,
            error_type: ErrorType::Random,
            channel_type: ChannelType::Wireless,
        }
    }

    #[tokio::test]
    async fn test_encode_remote_success() {
        let svc = service(MockBehavior::Succeed);
        let artifact = svc.handle_encode("  HELLO \n", 4).await.unwrap();
        assert_eq!(artifact.source_text, "HELLO");
        assert_eq!(artifact.origin, ResultOrigin::Remote);
        assert_eq!(artifact.result.encoded_payload, "remote:HELLO");
        assert_eq!(svc.snapshot().encoded(), Some(&artifact));
    }

    #[tokio::test]
    async fn test_encode_validation_never_reaches_network() {
        let svc = service(MockBehavior::Succeed);
        assert!(matches!(
            svc.handle_encode("   ", 4).await,
            Err(StudioError::Validation(ValidationError::EmptyInput))
        ));
        assert!(matches!(
            svc.handle_encode("HELLO", 51).await,
            Err(StudioError::Validation(
                ValidationError::EccSymbolsOutOfRange { value: 51, max: 50 }
            ))
        ));
        assert_eq!(svc.codec.encode_calls(), 0);
    }

    #[tokio::test]
    async fn test_encode_falls_back_when_unavailable() {
        let svc = service(MockBehavior::Unavailable);
        let artifact = svc.handle_encode("HELLO", 4).await.unwrap();
        assert!(artifact.origin.is_fallback());
        assert_eq!(artifact.result.encoded_payload, "SEVMTE8=_PPPP");
        assert_eq!(svc.stats().fallbacks, 1);
    }

    #[tokio::test]
    async fn test_simulate_requires_artifact() {
        let svc = service(MockBehavior::Succeed);
        assert!(matches!(
            svc.handle_simulate(params(10, 0.2)).await,
            Err(StudioError::NoEncodedData)
        ));
        assert_eq!(svc.codec.simulate_calls(), 0);
    }

    #[tokio::test]
    async fn test_simulate_timeout_falls_back() {
        let svc = service(MockBehavior::Hang);
        svc.handle_encode(&"a".repeat(20), 10).await.unwrap();

        let record = svc.handle_simulate(params(10, 0.5)).await.unwrap();
        assert_eq!(record.result.status, SimulationStatus::Partial);
        assert_eq!(record.result.errors_introduced, 10);
        assert_eq!(record.result.errors_corrected, 5);
        match &record.origin {
            ResultOrigin::LocalFallback { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(svc.snapshot().simulation(), Some(&record));
        assert_eq!(svc.stats().fallbacks, 2);
    }

    #[tokio::test]
    async fn test_rejected_simulate_leaves_session_unchanged() {
        let svc = service(MockBehavior::Reject("bad channel".into()));
        // Seed an artifact through a service whose codec is unavailable.
        let seeded = service(MockBehavior::Unavailable);
        let artifact = seeded.handle_encode("HELLO", 4).await.unwrap();
        svc.session.lock().replace_encoded(artifact);
        let before = svc.snapshot();

        assert!(matches!(
            svc.handle_simulate(params(4, 0.2)).await,
            Err(StudioError::RemoteError { .. })
        ));
        let after = svc.snapshot();
        assert_eq!(after.encoded(), before.encoded());
        assert!(after.simulation().is_none());
        assert_eq!(svc.stats().fallbacks, 0);
        assert_eq!(svc.stats().remote_errors, 1);
    }

    #[tokio::test]
    async fn test_concurrent_encode_is_busy() {
        let svc = Arc::new(service(MockBehavior::Hang));
        let _held = InFlight::acquire(&svc.encode_in_flight, Operation::Encode).unwrap();
        assert!(matches!(
            svc.handle_encode("HELLO", 4).await,
            Err(StudioError::Busy(Operation::Encode))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_simulate_encode() {
        let svc = service(MockBehavior::Hang);
        let seeded = svc.handle_encode(&"a".repeat(20), 10).await.unwrap();

        let shared = &svc;
        let late_simulate = || async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            shared.handle_simulate(params(10, 0.5)).await
        };
        let (first, second, encoded) = tokio::join!(
            late_simulate(),
            late_simulate(),
            svc.handle_encode("replacement", 4),
        );

        // One simulate ran against the seeded artifact, the other was refused.
        let (ran, refused) = match (first, second) {
            (Ok(record), Err(e)) | (Err(e), Ok(record)) => (record, e),
            other => panic!("expected one success and one busy, got {other:?}"),
        };
        assert_eq!(ran.result.status, SimulationStatus::Partial);
        assert_eq!(ran.result.errors_introduced, 10);
        assert!(matches!(refused, StudioError::Busy(Operation::Simulate)));
        assert_eq!(refused.to_string(), "simulate already in progress");

        // Encode overlapped the simulate and owns the session afterwards.
        let replacement = encoded.unwrap();
        assert_ne!(replacement.created_at, seeded.created_at);
        let session = svc.snapshot();
        assert_eq!(session.encoded(), Some(&replacement));
        assert!(session.simulation().is_none());

        assert_eq!(svc.codec.simulate_calls(), 1);
        assert_eq!(svc.stats().simulations, 1);
    }

    #[test]
    fn test_in_flight_guard_releases() {
        let flag = AtomicBool::new(false);
        {
            let _guard = InFlight::acquire(&flag, Operation::Simulate).unwrap();
            assert!(InFlight::acquire(&flag, Operation::Simulate).is_err());
        }
        assert!(InFlight::acquire(&flag, Operation::Simulate).is_ok());
    }

    #[tokio::test]
    async fn test_decode_local_fallback_round_trip() {
        let svc = service(MockBehavior::Unavailable);
        svc.handle_encode("héllo wörld", 6).await.unwrap();
        let outcome = svc.handle_decode(None).await.unwrap();
        assert_eq!(outcome.result.text, "héllo wörld");
        assert!(outcome.origin.is_fallback());
    }

    #[tokio::test]
    async fn test_export_requires_simulation() {
        let svc = service(MockBehavior::Succeed);
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            svc.export(dir.path()),
            Err(StudioError::NothingToExport)
        ));
    }

    #[tokio::test]
    async fn test_hex_preview_and_clear() {
        let svc = service(MockBehavior::Unavailable);
        assert!(svc.hex_preview().is_none());
        svc.handle_encode("HELLO", 2).await.unwrap();

        let preview = svc.hex_preview().unwrap();
        assert!(preview.hex.starts_with("53 45 56"));
        assert!(!preview.truncated);

        svc.clear();
        assert!(svc.hex_preview().is_none());
    }

    #[test]
    fn test_theme_loaded_and_persisted() {
        let prefs = Arc::new(MemoryPreferenceStore::with_theme(Theme::Dark));
        let svc = StudioService::new(
            Arc::new(MockCodecService::default()),
            prefs.clone(),
            StudioConfig::default(),
        )
        .unwrap();
        assert_eq!(svc.theme(), Theme::Dark);

        assert_eq!(svc.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(prefs.load_theme().unwrap(), Some(Theme::Light));
    }
}

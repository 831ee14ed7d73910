//! Domain Layer - request models, fallbacks and session state
//!
//! This layer contains:
//! - Encode request construction and the local encode fallback
//! - Simulate request construction and the local simulate fallback
//! - Decode requests and reversal of fallback payloads
//! - Session state (theme, current artifact, current simulation)
//! - Export documents
//! - Configuration
//!
//! RULES:
//! - No network I/O
//! - No async code
//! - No randomness

pub mod config;
pub mod decoding;
pub mod encoding;
pub mod errors;
pub mod export;
pub mod session;
pub mod simulation;

pub use config::{ApiRevision, ConfigError, SimulationDefaults, StudioConfig, TimeoutConfig};
pub use decoding::{
    build_decode_request, local_decode_fallback, DecodeRequest, DecodeResult, DecodeStatus,
};
pub use encoding::{
    build_encode_request, hex_preview, local_encode_fallback, EncodingRequest, EncodingResult,
    HexPreview, HEX_PREVIEW_LIMIT, PARITY_MARKER, PAYLOAD_SEPARATOR,
};
pub use errors::{Operation, StudioError, ValidationError};
pub use export::{export_file_name, write_export, SimulationExport, SYSTEM_NAME};
pub use session::{
    EncodedArtifact, ResultOrigin, Session, SimulationParameters, SimulationRecord, Theme,
};
pub use simulation::{
    build_simulate_request, local_simulate_fallback, success_rate_percent, validate_error_rate,
    ChannelType, ErrorType, SimulationRequest, SimulationResult, SimulationStatus,
    ERROR_COUNT_TOLERANCE,
};

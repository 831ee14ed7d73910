//! # Reed-Solomon Studio Codec Client
//!
//! Client side of a Reed-Solomon error-correction demo: builds encode,
//! simulate and decode requests for a remote codec service, normalizes its
//! responses, and approximates results locally when the service cannot be
//! reached.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Fallback policy
//!
//! | Remote outcome | Result |
//! |----------------|--------|
//! | Answer within the timeout | Remote result, `ResultOrigin::Remote` |
//! | Connect failure, DNS failure, timeout | Local approximation, `ResultOrigin::LocalFallback` |
//! | Non-2xx or non-success status | `StudioError::RemoteError`, session unchanged |
//! | Unrecognized response shape | `StudioError::Decode`, session unchanged |
//!
//! Local approximations are deterministic and are never a substitute for a
//! real decoding outcome; every held result carries its origin.
//!
//! ## Module Structure
//!
//! ```text
//! rss-codec/
//! ├── domain/          # Requests, fallbacks, session, export, config
//! ├── ports/           # StudioApi, CodecService, PreferenceStore
//! ├── adapters/        # HTTP client, wire schemas, preference file
//! └── service/         # StudioService session controller
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{FilePreferenceStore, HttpCodecService};
pub use domain::{
    build_decode_request, build_encode_request, build_simulate_request, hex_preview,
    local_decode_fallback, local_encode_fallback, local_simulate_fallback, ApiRevision,
    ChannelType, ConfigError, DecodeRequest, DecodeResult, DecodeStatus, EncodedArtifact,
    EncodingRequest, EncodingResult, ErrorType, HexPreview, Operation, ResultOrigin, Session,
    SimulationParameters, SimulationRecord, SimulationRequest, SimulationResult,
    SimulationStatus, StudioConfig, StudioError, Theme, ValidationError,
};
pub use ports::{
    CodecService, DecodeOutcome, MemoryPreferenceStore, MockBehavior, MockCodecService,
    PreferenceStore, ServiceHealth, StudioApi,
};
pub use service::{ServiceStats, StudioService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

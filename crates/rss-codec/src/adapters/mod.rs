//! Adapters - concrete implementations of the outbound ports.

pub mod http_client;
pub mod preferences;
pub mod schema;

pub use http_client::HttpCodecService;
pub use preferences::FilePreferenceStore;

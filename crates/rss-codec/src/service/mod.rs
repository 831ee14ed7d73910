//! Service layer - session controller over the outbound ports.

pub mod studio_service;

pub use studio_service::{ServiceStats, StudioService};

//! Services layer - orchestration logic
//!
//! This module coordinates the domain steps of a release.
//! Commands load inputs and hand them to services.

pub mod release_service;

// Re-export commonly used types
pub use release_service::{ReleasePlan, ReleaseService};

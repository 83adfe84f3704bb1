//! # API Shared
//!
//! Shared definitions for the triage gateway.
//!
//! Contains:
//! - JSON wire types with OpenAPI schemas (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and by clients that want typed request and response bodies.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;

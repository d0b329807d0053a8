//! Response models for the token cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{CleanupResponse, HealthResponse, StatsResponse, TokenResponse};

//! HTTP API over the consultation and health services
//!
//! Provides:
//! - Symptom diagnosis and correction endpoints
//! - The chat endpoint with dataset answers and fallback
//! - Health score and progression endpoints
//! - A status endpoint

pub mod server;
pub mod types;

pub use server::{router, ApiError, ApiServer, ApiServerConfig, ApiState};

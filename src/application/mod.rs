//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod consultation;
mod engine;
mod health;

pub use consultation::{
    diagnosis_message, ConsultReply, ConsultRequest, ConsultStage, ConsultationService,
    EngineStatus, CORRECTION_THANKS, FALLBACK_APOLOGY,
};
pub use engine::{CorrectionReceipt, DiagnosisEngine};
pub use health::HealthService;

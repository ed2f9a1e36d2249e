//! Adapters layer: Concrete implementations of ports.
//!
//! - `csv_dataset`: symptom dataset from CSV
//! - `json_feedback`, `sqlite`: feedback persistence (`backend` picks one)
//! - `groq`: chat completion fallback
//! - `graph`: disease progression predictor
//! - `sanitize`: log redaction

pub mod backend;
pub mod csv_dataset;
mod error;
pub mod graph;
pub mod groq;
pub mod json_feedback;
pub mod sanitize;
pub mod sqlite;

pub use backend::FeedbackBackend;
pub use error::StorageError;

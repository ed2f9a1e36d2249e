//! # medipredict
//!
//! Symptom matching with a user-correction feedback loop.
//!
//! This crate provides:
//! - A symptom matcher over a tabular disease dataset
//! - Persistent user corrections that override the dataset
//! - A chat completion fallback for unmatched descriptions
//! - Health scoring and disease progression prediction
//! - A terminal front end and an HTTP server
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (SymptomKey, DiseaseIndex, FeedbackStore, health rules)
//! - `ports`: Trait definitions for datasets, feedback storage, fallback, progression
//! - `adapters`: Concrete implementations (CSV, JSON file, SQLite, chat API)
//! - `application`: Use cases orchestrating domain and ports
//! - `api`: HTTP endpoints
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod api;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Prediction, PredictionSource, SymptomKey};

/// Result type for medipredict operations
pub type Result<T> = std::result::Result<T, MedipredictError>;

/// Main error type for medipredict
#[derive(Debug, thiserror::Error)]
pub enum MedipredictError {
    #[error("Failed to load dataset: {0}")]
    DataLoad(#[from] ports::DatasetError),

    #[error("Correction was not saved: {0}")]
    Persistence(#[from] adapters::StorageError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Fallback failed: {0}")]
    Fallback(#[from] ports::FallbackError),

    #[error("Progression prediction failed: {0}")]
    Progression(#[from] ports::ProgressionError),

    #[error("Health report failed: {0}")]
    Health(#[from] domain::HealthError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

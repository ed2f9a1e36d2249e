//! Dataset port: Trait for loading the symptom dataset.
//!
//! The dataset is read once at startup, before the disease index is built.

use crate::domain::DatasetRow;

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Dataset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of dataset rows (`Disease`, `Symptom_1..4`).
pub trait DatasetSource {
    /// Load every row into memory.
    ///
    /// # Errors
    /// Returns `DatasetError` if the source is missing or malformed.
    fn load_rows(&self) -> Result<Vec<DatasetRow>, DatasetError>;
}

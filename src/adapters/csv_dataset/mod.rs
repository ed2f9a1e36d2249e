//! CSV adapter: Implementation of DatasetSource.
//!
//! Reads the symptom dataset with columns `Disease` and `Symptom_1` through
//! `Symptom_4`. Extra columns (such as an unnamed index column) are ignored;
//! empty cells are treated as missing symptoms.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::domain::DatasetRow;
use crate::ports::{DatasetError, DatasetSource};

const DISEASE_COLUMN: &str = "Disease";

/// One CSV record.
#[derive(Debug, Deserialize)]
struct SymptomRecord {
    #[serde(rename = "Disease")]
    disease: String,
    #[serde(rename = "Symptom_1")]
    symptom_1: Option<String>,
    #[serde(rename = "Symptom_2")]
    symptom_2: Option<String>,
    #[serde(rename = "Symptom_3")]
    symptom_3: Option<String>,
    #[serde(rename = "Symptom_4")]
    symptom_4: Option<String>,
}

impl From<SymptomRecord> for DatasetRow {
    fn from(record: SymptomRecord) -> Self {
        DatasetRow::new(
            record.disease,
            vec![
                record.symptom_1,
                record.symptom_2,
                record.symptom_3,
                record.symptom_4,
            ],
        )
    }
}

/// Dataset stored in a CSV file.
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse rows from any reader.
    ///
    /// # Errors
    /// Returns `MissingColumn` if there is no `Disease` header, or
    /// `Malformed` if a record cannot be decoded.
    pub fn read_rows<R: Read>(reader: R) -> Result<Vec<DatasetRow>, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(map_csv_error)?;
        if !headers.iter().any(|h| h == DISEASE_COLUMN) {
            return Err(DatasetError::MissingColumn(DISEASE_COLUMN.to_string()));
        }

        reader
            .deserialize::<SymptomRecord>()
            .map(|record| record.map(DatasetRow::from).map_err(map_csv_error))
            .collect()
    }
}

fn map_csv_error(e: csv::Error) -> DatasetError {
    if e.is_io_error() {
        if let csv::ErrorKind::Io(io) = e.into_kind() {
            return DatasetError::Io(io);
        }
        return DatasetError::Malformed("I/O error while reading records".to_string());
    }
    DatasetError::Malformed(e.to_string())
}

impl DatasetSource for CsvDataset {
    fn load_rows(&self) -> Result<Vec<DatasetRow>, DatasetError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DatasetError::NotFound(self.path.display().to_string())
            } else {
                DatasetError::Io(e)
            }
        })?;

        let rows = Self::read_rows(std::io::BufReader::new(file))?;
        tracing::info!("Loaded {} dataset rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

//! Health service: health score and disease progression use cases.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::health::{health_score, predict_progression};
use crate::domain::{HealthReport, PastDisease, PatientHistory};
use crate::ports::ProgressionPredictor;
use crate::MedipredictError;

/// Service for health reports and future disease prediction.
pub struct HealthService<P>
where
    P: ProgressionPredictor,
{
    predictor: Arc<P>,
}

impl<P: ProgressionPredictor> Clone for HealthService<P> {
    fn clone(&self) -> Self {
        Self {
            predictor: Arc::clone(&self.predictor),
        }
    }
}

impl<P> HealthService<P>
where
    P: ProgressionPredictor,
{
    /// Create a new health service.
    pub fn new(predictor: Arc<P>) -> Self {
        Self { predictor }
    }

    /// Score the given history as of `today` and list likely future diseases.
    ///
    /// # Errors
    /// Returns `Health` for an unknown disease or a malformed date.
    pub fn health_report(
        &self,
        past_diseases: &[PastDisease],
        today: NaiveDate,
    ) -> Result<HealthReport, MedipredictError> {
        let health_score = health_score(past_diseases, today)?;
        let predicted_future_diseases = predict_progression(past_diseases);

        tracing::debug!(
            "Health report over {} records: score {:.2}, {} future diseases",
            past_diseases.len(),
            health_score,
            predicted_future_diseases.len()
        );

        Ok(HealthReport {
            health_score,
            predicted_future_diseases,
        })
    }

    /// [`health_report`](Self::health_report) as of the local date.
    ///
    /// # Errors
    /// Same as `health_report`.
    pub fn health_report_today(
        &self,
        past_diseases: &[PastDisease],
    ) -> Result<HealthReport, MedipredictError> {
        self.health_report(past_diseases, chrono::Local::now().date_naive())
    }

    /// Most likely next disease across the given patients.
    ///
    /// # Errors
    /// Returns `Progression` if the histories are empty, contain unknown
    /// diseases, or have no transitions.
    pub fn future_prediction(&self, patients: &[PatientHistory]) -> Result<String, MedipredictError> {
        let predicted = self.predictor.predict(patients)?;
        tracing::info!(
            "Predicted next disease {} from {} patients",
            predicted,
            patients.len()
        );
        Ok(predicted)
    }
}

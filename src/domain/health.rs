//! Chronic disease profiles, health score and rule-based progression.
//!
//! Each profile carries a severity (1-10), an exponential decay rate per day
//! and the diseases it commonly progresses to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format accepted for past disease records.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Severity, decay and progression for one chronic disease.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseProfile {
    pub name: &'static str,
    pub severity: f64,
    pub decay_rate: f64,
    pub progression: &'static [&'static str],
}

/// Known chronic diseases, in canonical order.
pub const DISEASE_PROFILES: [DiseaseProfile; 16] = [
    DiseaseProfile { name: "Diabetes", severity: 7.0, decay_rate: 0.03, progression: &["Hypertension", "Kidney Disease", "Heart Disease"] },
    DiseaseProfile { name: "Hypertension", severity: 7.0, decay_rate: 0.04, progression: &["Heart Disease", "Stroke"] },
    DiseaseProfile { name: "Heart Disease", severity: 9.0, decay_rate: 0.02, progression: &["Stroke", "Paralysis"] },
    DiseaseProfile { name: "Obesity", severity: 6.0, decay_rate: 0.05, progression: &["Diabetes", "Heart Disease"] },
    DiseaseProfile { name: "Smoking", severity: 8.0, decay_rate: 0.02, progression: &["Lung Cancer", "COPD"] },
    DiseaseProfile { name: "Lung Cancer", severity: 10.0, decay_rate: 0.01, progression: &["COPD", "Respiratory Failure"] },
    DiseaseProfile { name: "High BP", severity: 7.0, decay_rate: 0.04, progression: &["Stroke", "Kidney Disease"] },
    DiseaseProfile { name: "Stroke", severity: 9.0, decay_rate: 0.02, progression: &["Paralysis", "Cognitive Decline"] },
    DiseaseProfile { name: "Kidney Disease", severity: 8.0, decay_rate: 0.03, progression: &["Dialysis", "Kidney Failure"] },
    DiseaseProfile { name: "Asthma", severity: 6.0, decay_rate: 0.07, progression: &["COPD", "Lung Infections"] },
    DiseaseProfile { name: "Arthritis", severity: 5.0, decay_rate: 0.07, progression: &["Chronic Pain", "Mobility Issues"] },
    DiseaseProfile { name: "Alzheimer's", severity: 9.0, decay_rate: 0.02, progression: &["Memory Loss", "Cognitive Decline"] },
    DiseaseProfile { name: "Migraine", severity: 4.0, decay_rate: 0.1, progression: &["Chronic Headache", "Neurological Disorders"] },
    DiseaseProfile { name: "Depression", severity: 6.0, decay_rate: 0.06, progression: &["Anxiety", "Mental Health Decline"] },
    DiseaseProfile { name: "Anemia", severity: 5.0, decay_rate: 0.07, progression: &["Fatigue", "Organ Dysfunction"] },
    DiseaseProfile { name: "Thyroid Disorder", severity: 5.0, decay_rate: 0.07, progression: &["Metabolism Issues", "Hormonal Imbalance"] },
];

/// Look up a profile by exact name.
#[must_use]
pub fn profile(name: &str) -> Option<&'static DiseaseProfile> {
    DISEASE_PROFILES.iter().find(|p| p.name == name)
}

/// Errors from health scoring.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Unknown disease: {0}")]
    UnknownDisease(String),

    #[error("Invalid date '{date}', expected YYYY-MM-DD")]
    InvalidDate {
        date: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A disease the patient had, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastDisease {
    pub disease_name: String,
    /// Diagnosis date, `YYYY-MM-DD`
    pub date: String,
}

impl PastDisease {
    #[must_use]
    pub fn new(disease_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            disease_name: disease_name.into(),
            date: date.into(),
        }
    }

    fn parsed_date(&self) -> Result<NaiveDate, HealthError> {
        NaiveDate::parse_from_str(self.date.trim(), RECORD_DATE_FORMAT).map_err(|source| {
            HealthError::InvalidDate {
                date: self.date.clone(),
                source,
            }
        })
    }
}

/// Overall health score in [0, 100] as of `today`.
///
/// Each past disease subtracts `severity * exp(-decay_rate * days)`, where
/// `days` is the number of whole days since it was recorded. Future dates
/// count as zero days.
///
/// # Errors
/// Returns `UnknownDisease` or `InvalidDate` for the first bad record.
pub fn health_score(records: &[PastDisease], today: NaiveDate) -> Result<f64, HealthError> {
    let mut score = 100.0;
    for record in records {
        let profile = profile(&record.disease_name)
            .ok_or_else(|| HealthError::UnknownDisease(record.disease_name.clone()))?;
        let days = (today - record.parsed_date()?).num_days().max(0) as f64;
        score -= profile.severity * (-profile.decay_rate * days).exp();
    }
    Ok(score.clamp(0.0, 100.0))
}

/// Diseases the patient may progress to.
///
/// Union of the progression lists of every known past disease, in first-seen
/// order. Unknown diseases are skipped.
#[must_use]
pub fn predict_progression(records: &[PastDisease]) -> Vec<String> {
    let mut future: Vec<String> = Vec::new();
    for record in records {
        let Some(profile) = profile(&record.disease_name) else {
            continue;
        };
        for next in profile.progression {
            if !future.iter().any(|d| d == next) {
                future.push((*next).to_string());
            }
        }
    }
    future
}

/// Health score plus predicted future diseases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub health_score: f64,
    pub predicted_future_diseases: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, RECORD_DATE_FORMAT).expect("Valid date")
    }

    #[test]
    fn test_empty_history_scores_full() {
        let score = health_score(&[], day("2024-01-01")).expect("Should score");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_same_day_subtracts_full_severity() {
        let records = [PastDisease::new("Diabetes", "2024-01-01")];
        let score = health_score(&records, day("2024-01-01")).expect("Should score");
        assert!((score - 93.0).abs() < 1e-9);
    }

    #[test]
    fn test_impact_decays_over_time() {
        let records = [PastDisease::new("Migraine", "2024-01-01")];
        let score = health_score(&records, day("2024-01-11")).expect("Should score");
        let expected = 100.0 - 4.0 * (-0.1f64 * 10.0).exp();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_future_date_counts_as_today() {
        let records = [PastDisease::new("Asthma", "2030-01-01")];
        let score = health_score(&records, day("2024-01-01")).expect("Should score");
        assert!((score - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let records: Vec<PastDisease> = (0..20)
            .map(|_| PastDisease::new("Lung Cancer", "2024-01-01"))
            .collect();
        let score = health_score(&records, day("2024-01-01")).expect("Should score");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_unknown_disease_is_an_error() {
        let records = [PastDisease::new("Dragon Pox", "2024-01-01")];
        assert!(matches!(
            health_score(&records, day("2024-01-01")),
            Err(HealthError::UnknownDisease(name)) if name == "Dragon Pox"
        ));
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let records = [PastDisease::new("Diabetes", "01-01-2024")];
        assert!(matches!(
            health_score(&records, day("2024-01-01")),
            Err(HealthError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_progression_union_without_duplicates() {
        let records = [
            PastDisease::new("Diabetes", "2024-01-01"),
            PastDisease::new("Hypertension", "2024-01-01"),
            PastDisease::new("Unknown", "2024-01-01"),
        ];
        assert_eq!(
            predict_progression(&records),
            vec!["Hypertension", "Kidney Disease", "Heart Disease", "Stroke"]
        );
    }
}

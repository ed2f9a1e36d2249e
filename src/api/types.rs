//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::application::{ConsultReply, ConsultRequest, EngineStatus};
use crate::domain::{PastDisease, PatientHistory, Prediction, PredictionSource};

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnoseRequest {
    pub message: String,
}

/// Diagnosis result; `disease` is null when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub disease: Option<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PredictionSource>,
}

impl From<Prediction> for DiagnoseResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            confidence: prediction.confidence(),
            source: prediction.source(),
            disease: prediction.disease().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub message: String,
    pub disputed_disease: String,
    pub correct_disease: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Chat turn; `feedback` and `correct_disease` dispute the diagnosis.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub correct_disease: Option<String>,
}

impl From<ChatRequest> for ConsultRequest {
    fn from(request: ChatRequest) -> Self {
        Self {
            message: request.message,
            feedback: request.feedback,
            correct_disease: request.correct_disease,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl From<ConsultReply> for ChatResponse {
    fn from(reply: ConsultReply) -> Self {
        Self {
            response: reply.response,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthRequest {
    #[serde(default)]
    pub past_diseases: Vec<PastDisease>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FuturePredictionRequest {
    #[serde(default)]
    pub patient_data: Vec<PatientHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuturePredictionResponse {
    pub predicted_disease: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub dataset_entries: usize,
    pub feedback_entries: usize,
    pub fallback_available: bool,
}

impl From<EngineStatus> for ServiceStatus {
    fn from(status: EngineStatus) -> Self {
        Self {
            status: "ok".to_string(),
            dataset_entries: status.dataset_entries,
            feedback_entries: status.feedback_entries,
            fallback_available: status.fallback_available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

//! HTTP API server.
//!
//! Handlers hand every engine call to the blocking pool: corrections write
//! to disk synchronously and the chat fallback uses a blocking client.

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use super::types::{
    ChatRequest, ChatResponse, DiagnoseRequest, DiagnoseResponse, ErrorBody, FeedbackRequest,
    FuturePredictionRequest, FuturePredictionResponse, HealthRequest, ServiceStatus, StatusBody,
};
use crate::adapters::StorageError;
use crate::application::{ConsultRequest, ConsultationService, HealthService, FALLBACK_APOLOGY};
use crate::domain::HealthReport;
use crate::ports::{ConversationalFallback, FeedbackRepository, ProgressionPredictor};
use crate::MedipredictError;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 5000).into(),
        }
    }
}

/// Services shared by all handlers.
pub struct ApiState<R, F, P>
where
    R: FeedbackRepository,
    F: ConversationalFallback,
    P: ProgressionPredictor,
{
    pub consultation: ConsultationService<R, F>,
    pub health: HealthService<P>,
}

impl<R, F, P> Clone for ApiState<R, F, P>
where
    R: FeedbackRepository,
    F: ConversationalFallback,
    P: ProgressionPredictor,
{
    fn clone(&self) -> Self {
        Self {
            consultation: self.consultation.clone(),
            health: self.health.clone(),
        }
    }
}

/// Handler error, rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Service(MedipredictError),
    Internal(String),
}

impl From<MedipredictError> for ApiError {
    fn from(e: MedipredictError) -> Self {
        Self::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            Self::Service(e) => match &e {
                MedipredictError::Validation(_)
                | MedipredictError::Health(_)
                | MedipredictError::Progression(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                MedipredictError::Fallback(inner) => {
                    warn!("Chat fallback failed: {}", inner);
                    (StatusCode::BAD_GATEWAY, FALLBACK_APOLOGY.to_string())
                }
                other => {
                    error!("Request failed: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
                }
            },
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Run `f` on the blocking pool.
async fn blocking<T, Func>(f: Func) -> Result<T, ApiError>
where
    Func: FnOnce() -> Result<T, MedipredictError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Build the router over the given services.
pub fn router<R, F, P>(state: ApiState<R, F, P>) -> Router
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    Router::new()
        .route("/diagnose", post(diagnose_handler::<R, F, P>))
        .route("/feedback", post(feedback_handler::<R, F, P>))
        .route("/LLMchatbot", post(chat_handler::<R, F, P>))
        .route("/predict_health", post(predict_health_handler::<R, F, P>))
        .route("/future_prediction", post(future_prediction_handler::<R, F, P>))
        .route("/health", get(status_handler::<R, F, P>))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn diagnose_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
    payload: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<DiagnoseResponse>, ApiError>
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let Json(request) = payload?;
    let prediction = blocking(move || state.consultation.diagnose(&request.message)).await?;
    Ok(Json(prediction.into()))
}

async fn feedback_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<StatusBody>, ApiError>
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let Json(request) = payload?;
    blocking(move || {
        state.consultation.submit_correction(
            &request.message,
            &request.disputed_disease,
            &request.correct_disease,
        )
    })
    .await?;
    Ok(Json(StatusBody::ok()))
}

async fn chat_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let Json(request) = payload?;
    let request: ConsultRequest = request.into();
    let reply = blocking(move || state.consultation.consult(&request)).await?;
    Ok(Json(reply.into()))
}

async fn predict_health_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
    payload: Result<Json<HealthRequest>, JsonRejection>,
) -> Result<Json<HealthReport>, ApiError>
where
    R: FeedbackRepository + 'static,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let Json(request) = payload?;
    let report = state.health.health_report_today(&request.past_diseases)?;
    Ok(Json(report))
}

async fn future_prediction_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
    payload: Result<Json<FuturePredictionRequest>, JsonRejection>,
) -> Result<Json<FuturePredictionResponse>, ApiError>
where
    R: FeedbackRepository + 'static,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let Json(request) = payload?;
    let predicted_disease = state.health.future_prediction(&request.patient_data)?;
    Ok(Json(FuturePredictionResponse { predicted_disease }))
}

async fn status_handler<R, F, P>(
    State(state): State<ApiState<R, F, P>>,
) -> Result<Json<ServiceStatus>, ApiError>
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    let status = blocking(move || state.consultation.status()).await?;
    Ok(Json(status.into()))
}

/// API server
pub struct ApiServer<R, F, P>
where
    R: FeedbackRepository,
    F: ConversationalFallback,
    P: ProgressionPredictor,
{
    config: ApiServerConfig,
    state: ApiState<R, F, P>,
}

impl<R, F, P> ApiServer<R, F, P>
where
    R: FeedbackRepository + 'static,
    R::Error: Into<StorageError>,
    F: ConversationalFallback + 'static,
    P: ProgressionPredictor + 'static,
{
    /// Create new API server
    pub fn new(config: ApiServerConfig, state: ApiState<R, F, P>) -> Self {
        Self { config, state }
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns `Io` if the address cannot be bound or the server fails.
    pub async fn serve<S>(self, shutdown: S) -> Result<(), MedipredictError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("API server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

//! Composition root shared by the binaries.
//!
//! Builds the concrete adapters from [`Settings`] and installs the log
//! subscriber. The chat client is blocking, so services must be built and
//! dropped outside any async runtime.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::csv_dataset::CsvDataset;
use crate::adapters::graph::TransitionGraphPredictor;
use crate::adapters::groq::{ChatConfig, GroqChat};
use crate::adapters::json_feedback::JsonFeedbackFile;
use crate::adapters::sanitize::SanitizingMakeWriter;
use crate::adapters::sqlite::SqliteStorage;
use crate::adapters::FeedbackBackend;
use crate::api::ApiState;
use crate::application::{ConsultationService, DiagnosisEngine, HealthService};
use crate::config::{FeedbackBackendKind, LogMode, Settings};
use crate::MedipredictError;

pub type Consultation = ConsultationService<FeedbackBackend, GroqChat>;
pub type Health = HealthService<TransitionGraphPredictor>;
pub type ServerState = ApiState<FeedbackBackend, GroqChat, TransitionGraphPredictor>;

/// Fully wired services.
pub struct Services {
    pub consultation: Consultation,
    pub health: Health,
}

impl Services {
    /// Handler state for the HTTP API.
    #[must_use]
    pub fn api_state(&self) -> ServerState {
        ApiState {
            consultation: self.consultation.clone(),
            health: self.health.clone(),
        }
    }
}

/// Install the global log subscriber.
///
/// With [`LogMode::Auto`], logs go to the file when `prefer_file` is set and
/// to stdout otherwise. Keep the returned guard alive until exit so buffered
/// lines are flushed.
///
/// # Errors
/// Returns `Io` if the log file cannot be opened, or `Config` if a
/// subscriber is already installed.
pub fn init_logging(settings: &Settings, prefer_file: bool) -> Result<WorkerGuard, MedipredictError> {
    let use_file = match settings.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => prefer_file,
    };

    let (writer, guard) = if use_file {
        if let Some(parent) = settings.log_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .try_init()
        .map_err(|e| MedipredictError::Config(format!("Logging already initialized: {e}")))?;

    Ok(guard)
}

/// Open the configured feedback repository.
///
/// # Errors
/// Returns `Persistence` if the SQLite database cannot be opened.
pub fn feedback_backend(settings: &Settings) -> Result<FeedbackBackend, MedipredictError> {
    Ok(match settings.feedback_backend {
        FeedbackBackendKind::Json => JsonFeedbackFile::new(&settings.feedback_path).into(),
        FeedbackBackendKind::Sqlite => SqliteStorage::new(&settings.feedback_db_path)?.into(),
    })
}

/// Build every service from settings.
///
/// # Errors
/// Returns `DataLoad` if the dataset cannot be read, `Persistence` if stored
/// corrections cannot be read, or `Fallback` if the chat client cannot be built.
pub fn build_services(settings: &Settings) -> Result<Services, MedipredictError> {
    let repository = feedback_backend(settings)?;
    let engine = DiagnosisEngine::from_dataset(&CsvDataset::new(&settings.dataset_path), repository)?;

    let chat = GroqChat::new(ChatConfig {
        api_key: settings.llm_api_key.clone(),
        base_url: settings.llm_base_url.clone(),
        model: settings.llm_model.clone(),
        ..ChatConfig::default()
    })?;

    Ok(Services {
        consultation: ConsultationService::new(engine, Arc::new(chat)),
        health: HealthService::new(Arc::new(TransitionGraphPredictor::new())),
    })
}

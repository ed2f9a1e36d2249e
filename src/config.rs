//! Runtime settings read from `MEDIPREDICT_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::MedipredictError;

const DEFAULT_DATASET_PATH: &str = "symtoms_df.csv";
const DEFAULT_FEEDBACK_PATH: &str = "user_feedback.json";
const DEFAULT_FEEDBACK_DB_PATH: &str = "user_feedback.db";
const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_LOG_FILE: &str = "medipredict.log";

/// Where user corrections are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackBackendKind {
    Json,
    Sqlite,
}

impl FromStr for FeedbackBackendKind {
    type Err = MedipredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(MedipredictError::Config(format!(
                "MEDIPREDICT_FEEDBACK_BACKEND must be 'json' or 'sqlite', got '{other}'"
            ))),
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise
    Auto,
    File,
    Stdout,
}

impl FromStr for LogMode {
    type Err = MedipredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(MedipredictError::Config(format!(
                "MEDIPREDICT_LOG_MODE must be 'auto', 'file' or 'stdout', got '{other}'"
            ))),
        }
    }
}

/// All runtime settings.
#[derive(Clone)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub feedback_backend: FeedbackBackendKind,
    pub feedback_path: PathBuf,
    pub feedback_db_path: PathBuf,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub http_addr: SocketAddr,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("dataset_path", &self.dataset_path)
            .field("feedback_backend", &self.feedback_backend)
            .field("feedback_path", &self.feedback_path)
            .field("feedback_db_path", &self.feedback_db_path)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<set>"))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("http_addr", &self.http_addr)
            .field("log_mode", &self.log_mode)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns `Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, MedipredictError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; unset and blank values take defaults.
    ///
    /// # Errors
    /// Returns `Config` if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MedipredictError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let http_addr = get_or("MEDIPREDICT_HTTP_ADDR", DEFAULT_HTTP_ADDR);
        let http_addr = http_addr.trim().parse::<SocketAddr>().map_err(|e| {
            MedipredictError::Config(format!("MEDIPREDICT_HTTP_ADDR '{http_addr}': {e}"))
        })?;

        Ok(Self {
            dataset_path: get_or("MEDIPREDICT_DATASET_PATH", DEFAULT_DATASET_PATH).into(),
            feedback_backend: get_or("MEDIPREDICT_FEEDBACK_BACKEND", "json").parse()?,
            feedback_path: get_or("MEDIPREDICT_FEEDBACK_PATH", DEFAULT_FEEDBACK_PATH).into(),
            feedback_db_path: get_or("MEDIPREDICT_FEEDBACK_DB_PATH", DEFAULT_FEEDBACK_DB_PATH)
                .into(),
            llm_api_key: get("MEDIPREDICT_LLM_API_KEY").or_else(|| get("GROQ_API_KEY")),
            llm_base_url: get_or("MEDIPREDICT_LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: get_or("MEDIPREDICT_LLM_MODEL", DEFAULT_LLM_MODEL),
            http_addr,
            log_mode: get_or("MEDIPREDICT_LOG_MODE", "auto").parse()?,
            log_file: get_or("MEDIPREDICT_LOG_FILE", DEFAULT_LOG_FILE).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, MedipredictError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).expect("Should use defaults");
        assert_eq!(s.dataset_path, PathBuf::from("symtoms_df.csv"));
        assert_eq!(s.feedback_path, PathBuf::from("user_feedback.json"));
        assert_eq!(s.feedback_backend, FeedbackBackendKind::Json);
        assert_eq!(s.http_addr.port(), 5000);
        assert_eq!(s.log_mode, LogMode::Auto);
        assert!(s.llm_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("MEDIPREDICT_FEEDBACK_BACKEND", "SQLite"),
            ("MEDIPREDICT_HTTP_ADDR", "0.0.0.0:8080"),
            ("MEDIPREDICT_LOG_MODE", "stdout"),
            ("MEDIPREDICT_LLM_MODEL", "llama-3.1-8b-instant"),
        ])
        .expect("Should parse");
        assert_eq!(s.feedback_backend, FeedbackBackendKind::Sqlite);
        assert_eq!(s.http_addr.port(), 8080);
        assert_eq!(s.log_mode, LogMode::Stdout);
        assert_eq!(s.llm_model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_api_key_fallback_variable() {
        let s = settings(&[("GROQ_API_KEY", "gsk_test")]).expect("Should parse");
        assert_eq!(s.llm_api_key.as_deref(), Some("gsk_test"));

        let s = settings(&[("GROQ_API_KEY", "gsk_a"), ("MEDIPREDICT_LLM_API_KEY", "gsk_b")])
            .expect("Should parse");
        assert_eq!(s.llm_api_key.as_deref(), Some("gsk_b"));
    }

    #[test]
    fn test_blank_values_take_defaults() {
        let s = settings(&[("MEDIPREDICT_LLM_API_KEY", "  "), ("MEDIPREDICT_DATASET_PATH", "")])
            .expect("Should parse");
        assert!(s.llm_api_key.is_none());
        assert_eq!(s.dataset_path, PathBuf::from("symtoms_df.csv"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let s = settings(&[("MEDIPREDICT_LLM_API_KEY", "gsk_secret")]).expect("Should parse");
        let debug = format!("{s:?}");
        assert!(debug.contains("<set>"));
        assert!(!debug.contains("gsk_secret"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings(&[("MEDIPREDICT_FEEDBACK_BACKEND", "redis")]),
            Err(MedipredictError::Config(_))
        ));
        assert!(matches!(
            settings(&[("MEDIPREDICT_HTTP_ADDR", "localhost")]),
            Err(MedipredictError::Config(_))
        ));
        assert!(matches!(
            settings(&[("MEDIPREDICT_LOG_MODE", "syslog")]),
            Err(MedipredictError::Config(_))
        ));
    }
}

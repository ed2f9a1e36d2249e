//! Conversational fallback port: Trait for the chat completion service.
//!
//! Used only when the symptom matcher has no diagnosis. The user's text is
//! passed through verbatim and the completion is returned unmodified.

/// Errors from the fallback service.
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("Chat fallback is not configured")]
    Unavailable,

    #[error("Chat request failed: {0}")]
    Request(String),

    #[error("Chat service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Chat service returned no completion")]
    EmptyResponse,
}

/// Trait for a text completion service.
pub trait ConversationalFallback: Send + Sync {
    /// Complete `text`.
    ///
    /// # Errors
    /// Returns `FallbackError` if the service is unavailable or fails.
    fn complete(&self, text: &str) -> Result<String, FallbackError>;

    /// Whether the service is configured at all.
    fn is_available(&self) -> bool {
        true
    }
}

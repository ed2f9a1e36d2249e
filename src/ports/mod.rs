//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (dataset files, feedback
//! storage, the chat completion service, the progression model).

mod dataset;
mod fallback;
mod feedback;
mod progression;

pub use dataset::{DatasetError, DatasetSource};
pub use fallback::{ConversationalFallback, FallbackError};
pub use feedback::FeedbackRepository;
pub use progression::{ProgressionError, ProgressionPredictor};

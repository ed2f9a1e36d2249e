//! Feedback port: Trait for durable storage of user corrections.
//!
//! Repositories always read and write the whole store. A save replaces
//! whatever was stored before.

use crate::domain::FeedbackStore;

/// Trait for persisting the feedback store.
pub trait FeedbackRepository: Send + Sync {
    /// Error type for repository operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored corrections.
    ///
    /// # Returns
    /// An empty store if nothing has been saved yet.
    ///
    /// # Errors
    /// Returns error if storage cannot be read.
    fn load(&self) -> Result<FeedbackStore, Self::Error>;

    /// Replace the stored corrections with `store`.
    ///
    /// # Errors
    /// Returns error if storage cannot be written.
    fn save(&self, store: &FeedbackStore) -> Result<(), Self::Error>;

    /// Human-readable location, for logs and status screens.
    fn location(&self) -> String;
}

//! TUI module: Terminal User Interface using Ratatui.
//!
//! - Dashboard with engine status and session counts
//! - Consultation chat with correction prompts

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::Theme;
pub use worker::{ConsultProgress, ConsultWorker, ConsultWorkerHandle};

//! medipredict: symptom checker with user corrections.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;

use medipredict::bootstrap;
use medipredict::config::Settings;
use medipredict::tui::App;

fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    // Logs on the terminal would corrupt the alternate screen, so an
    // interactive session logs to a file unless told otherwise.
    let _guard = bootstrap::init_logging(&settings, std::io::stdout().is_terminal())?;

    tracing::info!("Starting medipredict...");

    let mut app = App::new(&settings)?;
    app.run()?;

    tracing::info!("medipredict shutdown complete.");
    Ok(())
}

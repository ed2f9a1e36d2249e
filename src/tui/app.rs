//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Consultation turns via background worker

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::bootstrap::{self, Consultation};
use crate::config::Settings;

use super::ui::{
    consult::{render_consult, ConsultPhase, ConsultState, SubmitAction},
    dashboard::{render_dashboard, DashboardState},
    render_disclaimer,
};
use super::worker::{ConsultProgress, ConsultWorker, ConsultWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Consult,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    consultation: Consultation,
    dashboard_state: DashboardState,
    consult_state: ConsultState,

    /// Pending consultation turn (if running)
    pending_worker: Option<ConsultWorkerHandle>,
}

impl App {
    /// Create a new application from settings.
    ///
    /// # Errors
    /// Returns error if the dataset or stored corrections cannot be loaded.
    pub fn new(settings: &Settings) -> Result<Self> {
        let services =
            bootstrap::build_services(settings).context("Failed to initialize services")?;
        Ok(Self::with_consultation(services.consultation))
    }

    /// Create application with an already wired consultation service.
    #[must_use]
    pub fn with_consultation(consultation: Consultation) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            consultation,
            dashboard_state: DashboardState::default(),
            consult_state: ConsultState::default(),
            pending_worker: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.update_dashboard_state();

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        // Let an in-flight correction finish saving.
        if let Some(worker) = self.pending_worker.take() {
            while worker.recv().is_some() {}
        }
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Dashboard => render_dashboard(f, chunks[0], &self.dashboard_state),
                    Screen::Consult => render_consult(f, chunks[0], &self.consult_state),
                }
                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to stay responsive
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Poll the background worker for progress updates.
    fn poll_worker(&mut self) {
        loop {
            let Some(progress) = self
                .pending_worker
                .as_ref()
                .and_then(ConsultWorkerHandle::try_recv)
            else {
                break;
            };

            match progress {
                ConsultProgress::Stage(stage) => self.consult_state.set_stage(stage),
                ConsultProgress::Complete(reply) => {
                    self.dashboard_state
                        .session
                        .record(&reply.prediction, reply.correction.is_some());
                    self.consult_state.complete(reply);
                    self.pending_worker = None;
                    self.update_dashboard_state();
                }
                ConsultProgress::Error(message) => {
                    self.consult_state.fail(message);
                    self.pending_worker = None;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Consult => self.handle_consult_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Enter => {
                self.screen = Screen::Consult;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.update_dashboard_state(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_consult_key(&mut self, key: KeyCode) {
        if key == KeyCode::Esc {
            self.screen = Screen::Dashboard;
            return;
        }

        if matches!(self.consult_state.phase, ConsultPhase::AwaitingVerdict { .. }) {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.consult_state.verdict(true),
                KeyCode::Char('n') | KeyCode::Char('N') => self.consult_state.verdict(false),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Char(c) => self.consult_state.input_char(c),
            KeyCode::Backspace => self.consult_state.delete_char(),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        match self.consult_state.submit() {
            SubmitAction::Run(request) => {
                self.pending_worker =
                    Some(ConsultWorker::spawn(self.consultation.clone(), request));
            }
            SubmitAction::Leave => {
                self.consult_state = ConsultState::default();
                self.screen = Screen::Dashboard;
            }
            SubmitAction::Nothing => {}
        }
    }

    fn update_dashboard_state(&mut self) {
        match self.consultation.status() {
            Ok(status) => self.dashboard_state.status = Some(status),
            Err(e) => {
                tracing::error!("Failed to read engine status: {}", e);
                self.dashboard_state.status = None;
            }
        }
    }
}

//! Dashboard view: engine status and session summary.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::application::EngineStatus;
use crate::domain::Prediction;
use crate::tui::styles::Theme;

/// What happened during this session.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub consultations: usize,
    pub diagnoses: usize,
    pub corrections: usize,
    pub last_prediction: Option<Prediction>,
}

impl SessionSummary {
    /// Count a finished consultation turn.
    pub fn record(&mut self, prediction: &Prediction, corrected: bool) {
        self.consultations += 1;
        if prediction.is_diagnosed() {
            self.diagnoses += 1;
            self.last_prediction = Some(prediction.clone());
        }
        if corrected {
            self.corrections += 1;
        }
    }
}

/// Dashboard state for rendering.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub status: Option<EngineStatus>,
    pub session: SessionSummary,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], state);
    render_session(f, columns[1], &state.session);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled("medipredict", Theme::title()),
        Span::styled(" │ ", Theme::faint()),
        Span::styled("Symptom Checker", Theme::dim()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Engine status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let status_items = match &state.status {
        Some(status) => vec![
            format_count("Dataset entries", status.dataset_entries),
            format_count("Corrections", status.feedback_entries),
            format_status_item("Chat assistant", status.fallback_available),
            Line::from(vec![
                Span::styled("  Store: ", Theme::dim()),
                Span::styled(status.feedback_location.clone(), Theme::faint()),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "  Status unavailable",
            Theme::bad(),
        ))],
    };

    let status_block = Block::default()
        .title(Span::styled(" Engine ", Theme::heading()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[C] ", Theme::key_hint()),
            Span::styled("Consultation", Theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("[R] ", Theme::key_hint()),
            Span::styled("Refresh", Theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", Theme::key_hint()),
            Span::styled("Quit", Theme::dim()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", Theme::heading()))
        .borders(Borders::ALL)
        .border_style(Theme::border());
    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn format_count(label: &str, count: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), Theme::dim()),
        Span::styled(count.to_string(), Theme::text()),
    ])
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", Theme::good())
    } else {
        ("OFF", Theme::caution())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), Theme::text()),
    ])
}

fn render_session(f: &mut Frame, area: Rect, session: &SessionSummary) {
    let block = Block::default()
        .title(Span::styled(" This Session ", Theme::heading()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    if session.consultations == 0 {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No consultations yet. Press [C] to start.",
            Theme::faint(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let lines = vec![
        format_count("Questions asked", session.consultations),
        format_count("Diagnoses", session.diagnoses),
        format_count("Corrections saved", session.corrections),
    ];
    f.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(Prediction::Diagnosed {
        disease,
        confidence,
        source,
    }) = &session.last_prediction
    {
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(Span::styled(format!(" Last: {disease} "), Theme::source(*source)))
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .gauge_style(Theme::confidence(*confidence))
            .percent(confidence.clamp(0.0, 100.0) as u16)
            .label(format!("{confidence:.2}%"));
        f.render_widget(gauge, chunks[1]);
    }
}

//! UI module: View components for the TUI.

pub mod consult;
pub mod dashboard;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::Theme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Predictions come from symptom matching and are not a medical diagnosis.",
            Theme::faint(),
        )]),
        Line::from(vec![Span::styled(
            "Please consult a doctor for confirmation.",
            Theme::faint(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Theme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

//! Color palette and preset styles for the consultation UI.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{PredictionSource, MATCH_THRESHOLD};

/// Theme shared by every view.
pub struct Theme;

impl Theme {
    /// Teal accent
    pub const ACCENT: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Light teal for headings
    pub const ACCENT_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Dark teal for the header bar
    pub const ACCENT_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const GOOD: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const CAUTION: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const BAD: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const NOTE: Color = Color::Rgb(59, 130, 246); // #3B82F6

    pub const TEXT: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_DIM: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_FAINT: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default().fg(Self::TEXT).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn heading() -> Style {
        Style::default()
            .fg(Self::ACCENT_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT)
    }

    #[must_use]
    pub fn dim() -> Style {
        Style::default().fg(Self::TEXT_DIM)
    }

    #[must_use]
    pub fn faint() -> Style {
        Style::default().fg(Self::TEXT_FAINT)
    }

    #[must_use]
    pub fn good() -> Style {
        Style::default().fg(Self::GOOD)
    }

    #[must_use]
    pub fn caution() -> Style {
        Style::default().fg(Self::CAUTION)
    }

    #[must_use]
    pub fn bad() -> Style {
        Style::default().fg(Self::BAD)
    }

    #[must_use]
    pub fn note() -> Style {
        Style::default().fg(Self::NOTE)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_active() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn header_bar() -> Style {
        Style::default()
            .fg(Self::TEXT)
            .bg(Self::ACCENT_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// User lines in the transcript.
    #[must_use]
    pub fn user() -> Style {
        Style::default()
            .fg(Self::ACCENT_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Where a diagnosis came from.
    #[must_use]
    pub fn source(source: PredictionSource) -> Style {
        match source {
            PredictionSource::Feedback => Self::note(),
            PredictionSource::Dataset => Self::good(),
        }
    }

    /// Confidence colored against the match threshold.
    #[must_use]
    pub fn confidence(confidence: f64) -> Style {
        if confidence >= 90.0 {
            Self::good()
        } else if confidence >= MATCH_THRESHOLD {
            Self::caution()
        } else {
            Self::bad()
        }
    }
}

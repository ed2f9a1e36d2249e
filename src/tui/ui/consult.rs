//! Consultation view: chat transcript, symptom input and correction prompts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{ConsultReply, ConsultRequest, ConsultStage};
use crate::domain::Prediction;
use crate::tui::styles::Theme;

const GREETING: &str =
    "Hello! I'm your assistant. You can ask me anything about health-related topics.";
const VERDICT_PROMPT: &str = "Is this diagnosis correct? [y/n]";
const CORRECTION_PROMPT: &str = "What is the correct disease?";
const EXIT_WORDS: [&str; 3] = ["exit", "bye", "quit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
    /// Set on lines that carry a diagnosis
    pub prediction: Option<Prediction>,
}

/// Where the conversation stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsultPhase {
    /// Typing a symptom description or question
    Composing,
    /// A turn is running on the worker
    Waiting { stage: Option<ConsultStage> },
    /// A diagnosis was shown and needs a yes/no
    AwaitingVerdict { message: String },
    /// The user said no and is typing the correct disease
    EnteringCorrection { message: String },
}

/// What the app should do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Nothing,
    Run(ConsultRequest),
    Leave,
}

/// Consultation screen state.
#[derive(Debug, Clone)]
pub struct ConsultState {
    pub input: String,
    pub phase: ConsultPhase,
    pub transcript: Vec<TranscriptLine>,
    pub error: Option<String>,
    pending_message: Option<String>,
}

impl Default for ConsultState {
    fn default() -> Self {
        Self {
            input: String::new(),
            phase: ConsultPhase::Composing,
            transcript: vec![TranscriptLine {
                speaker: Speaker::Assistant,
                text: GREETING.to_string(),
                prediction: None,
            }],
            error: None,
            pending_message: None,
        }
    }
}

impl ConsultState {
    fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(TranscriptLine {
            speaker,
            text: text.into(),
            prediction: None,
        });
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, ConsultPhase::Waiting { .. })
    }

    #[must_use]
    pub fn accepts_text(&self) -> bool {
        matches!(
            self.phase,
            ConsultPhase::Composing | ConsultPhase::EnteringCorrection { .. }
        )
    }

    pub fn input_char(&mut self, c: char) {
        if self.accepts_text() {
            self.input.push(c);
            self.error = None;
        }
    }

    pub fn delete_char(&mut self) {
        if self.accepts_text() {
            self.input.pop();
        }
    }

    /// Submit the input line for the current phase.
    pub fn submit(&mut self) -> SubmitAction {
        let text = self.input.trim().to_string();

        match self.phase.clone() {
            ConsultPhase::Composing => {
                if text.is_empty() {
                    return SubmitAction::Nothing;
                }
                self.input.clear();
                if EXIT_WORDS.contains(&text.to_lowercase().as_str()) {
                    self.push(Speaker::Assistant, "Goodbye!");
                    return SubmitAction::Leave;
                }
                self.push(Speaker::User, text.clone());
                self.pending_message = Some(text.clone());
                self.phase = ConsultPhase::Waiting { stage: None };
                SubmitAction::Run(ConsultRequest::new(text))
            }
            ConsultPhase::EnteringCorrection { message } => {
                if text.is_empty() {
                    self.error = Some("Please enter the correct disease".to_string());
                    return SubmitAction::Nothing;
                }
                self.input.clear();
                self.push(Speaker::User, text.clone());
                self.pending_message = Some(message.clone());
                self.phase = ConsultPhase::Waiting { stage: None };
                SubmitAction::Run(ConsultRequest::new(message).with_verdict("no", text))
            }
            ConsultPhase::Waiting { .. } | ConsultPhase::AwaitingVerdict { .. } => {
                SubmitAction::Nothing
            }
        }
    }

    /// Answer the yes/no prompt after a diagnosis.
    pub fn verdict(&mut self, correct: bool) {
        let ConsultPhase::AwaitingVerdict { message } = self.phase.clone() else {
            return;
        };
        if correct {
            self.push(Speaker::User, "yes");
            self.phase = ConsultPhase::Composing;
        } else {
            self.push(Speaker::User, "no");
            self.push(Speaker::System, CORRECTION_PROMPT);
            self.phase = ConsultPhase::EnteringCorrection { message };
        }
    }

    pub fn set_stage(&mut self, stage: ConsultStage) {
        if self.is_busy() {
            self.phase = ConsultPhase::Waiting { stage: Some(stage) };
        }
    }

    /// Show a finished turn.
    pub fn complete(&mut self, reply: ConsultReply) {
        let message = self.pending_message.take().unwrap_or_default();
        let ask_verdict = reply.prediction.is_diagnosed() && reply.correction.is_none();

        self.transcript.push(TranscriptLine {
            speaker: Speaker::Assistant,
            text: reply.response,
            prediction: Some(reply.prediction).filter(Prediction::is_diagnosed),
        });

        if ask_verdict {
            self.push(Speaker::System, VERDICT_PROMPT);
            self.phase = ConsultPhase::AwaitingVerdict { message };
        } else {
            self.phase = ConsultPhase::Composing;
        }
    }

    /// Show a failed turn.
    pub fn fail(&mut self, message: String) {
        self.pending_message = None;
        self.push(Speaker::Assistant, message.clone());
        self.error = Some(message);
        self.phase = ConsultPhase::Composing;
    }
}

fn stage_label(stage: Option<ConsultStage>) -> &'static str {
    match stage {
        None | Some(ConsultStage::Matching) => "Matching symptoms...",
        Some(ConsultStage::AskingFallback) => "Asking the assistant...",
        Some(ConsultStage::SavingCorrection) => "Saving your correction...",
    }
}

/// Render the consultation view.
pub fn render_consult(f: &mut Frame, area: Rect, state: &ConsultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Transcript
            Constraint::Length(3), // Input
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    render_transcript(f, chunks[0], state);
    render_input(f, chunks[1], state);
    render_hints(f, chunks[2], state);
}

fn transcript_line(line: &TranscriptLine) -> Line<'_> {
    let (label, label_style) = match line.speaker {
        Speaker::User => ("You: ", Theme::user()),
        Speaker::Assistant => ("Bot: ", Theme::heading()),
        Speaker::System => ("", Theme::faint()),
    };

    let text_style = match (&line.prediction, line.speaker) {
        (Some(Prediction::Diagnosed { source, .. }), _) => Theme::source(*source),
        (_, Speaker::System) => Theme::dim(),
        _ => Theme::text(),
    };

    Line::from(vec![
        Span::styled(label, label_style),
        Span::styled(line.text.as_str(), text_style),
    ])
}

fn render_transcript(f: &mut Frame, area: Rect, state: &ConsultState) {
    let block = Block::default()
        .title(Span::styled(" Consultation ", Theme::heading()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let mut lines: Vec<Line> = state.transcript.iter().map(transcript_line).collect();
    if let ConsultPhase::Waiting { stage } = state.phase {
        lines.push(Line::from(Span::styled(stage_label(stage), Theme::caution())));
    }

    // Keep the newest lines in view.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn render_input(f: &mut Frame, area: Rect, state: &ConsultState) {
    let title = match state.phase {
        ConsultPhase::EnteringCorrection { .. } => " Correct disease ",
        _ => " Describe your symptoms ",
    };
    let border = if state.accepts_text() {
        Theme::border_active()
    } else {
        Theme::border()
    };

    let content = match &state.error {
        Some(err) if state.input.is_empty() => Line::from(Span::styled(err.as_str(), Theme::bad())),
        _ => Line::from(vec![
            Span::styled(state.input.as_str(), Theme::text()),
            Span::styled("_", Theme::key_hint()),
        ]),
    };

    let p = Paragraph::new(content).block(
        Block::default()
            .title(Span::styled(title, Theme::heading()))
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(p, area);
}

fn render_hints(f: &mut Frame, area: Rect, state: &ConsultState) {
    let hints: Vec<(&str, &str)> = match state.phase {
        ConsultPhase::Composing => vec![("[Enter] ", "Send  "), ("[Esc] ", "Dashboard")],
        ConsultPhase::EnteringCorrection { .. } => vec![("[Enter] ", "Save correction  ")],
        ConsultPhase::AwaitingVerdict { .. } => vec![("[Y] ", "Correct  "), ("[N] ", "Wrong")],
        ConsultPhase::Waiting { .. } => vec![("", "Please wait...")],
    };

    let spans: Vec<Span> = hints
        .into_iter()
        .flat_map(|(key, desc)| [Span::styled(key, Theme::key_hint()), Span::styled(desc, Theme::dim())])
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

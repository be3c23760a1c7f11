use crate::model::{FileSummary, InfoEvent, SessionSnapshot};
use crate::orchestrator::UiCommand;
use crate::preview::Preview;
use crate::session::AnalysisState;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::path::PathBuf;

pub struct UiState {
    pub tab: usize,
    pub info: String,
    pub base_url: String,
    pub backend_healthy: Option<bool>,

    // Mirrors the controller's latest snapshot.
    pub file: Option<FileSummary>,
    pub preview: Option<Preview>,
    pub analysis: AnalysisState,

    // Path input line
    pub editing: bool,
    pub input: String,

    pub spinner_frame: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            info: String::new(),
            base_url: String::new(),
            backend_healthy: None,
            file: None,
            preview: None,
            analysis: AnalysisState::Idle,
            editing: false,
            input: String::new(),
            spinner_frame: 0,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug)]
pub(crate) enum KeyAction {
    None,
    Send(UiCommand),
    Quit,
}

impl UiState {
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.file = snapshot.file;
        self.preview = snapshot.preview;
        self.analysis = snapshot.state;
    }

    pub fn apply_info(&mut self, info: InfoEvent) {
        if let InfoEvent::Health { healthy, .. } = &info {
            self.backend_healthy = Some(*healthy);
        }
        self.info = info.to_message();
    }

    /// Mirrors the disabled state of the analyze action: no file, or busy.
    pub fn can_analyze(&self) -> bool {
        self.file.is_some() && !self.analysis.is_running()
    }

    pub(crate) fn handle_key(&mut self, modifiers: KeyModifiers, code: KeyCode) -> KeyAction {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        if self.editing {
            return self.handle_input_key(code);
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char('o') | KeyCode::Char('i') => {
                self.tab = 0;
                self.editing = true;
                self.input.clear();
                self.info = "Enter image path, Enter to select, Esc to cancel".into();
                KeyAction::None
            }
            KeyCode::Char('a') | KeyCode::Enter => {
                if self.analysis.is_running() {
                    self.info = "Analysis already in progress".into();
                }
                KeyAction::Send(UiCommand::Analyze)
            }
            KeyCode::Char('r') => {
                self.info = "Reset".into();
                KeyAction::Send(UiCommand::Reset)
            }
            KeyCode::Tab => {
                self.tab = (self.tab + 1) % 2;
                KeyAction::None
            }
            KeyCode::Char('?') => {
                self.tab = 1;
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) -> KeyAction {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.input.clear();
                self.info = "Selection cancelled".into();
                KeyAction::None
            }
            KeyCode::Enter => {
                self.editing = false;
                let path = clean_path_input(&self.input);
                self.input.clear();
                if path.is_empty() {
                    return KeyAction::None;
                }
                self.info = format!("Loading {}", path);
                KeyAction::Send(UiCommand::Select(PathBuf::from(path)))
            }
            KeyCode::Backspace => {
                self.input.pop();
                KeyAction::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }
}

/// Trim whitespace and the quotes terminals add around dropped file paths.
pub fn clean_path_input(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Borders plus one column of padding on each side.
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}

//! The text-entry side of a search session
use crate::config::SearchSettings;
use crate::error::{LengthBound, Result, TreefindError};

/// Text entry the query is typed into, plus the places results are reported.
pub trait InputCollaborator {
    fn text(&self) -> String;
    fn clear(&mut self);

    /// Shows a validation message next to the input.
    fn show_message(&mut self, message: &str);
    fn hide_message(&mut self);
    fn is_message_shown(&self) -> bool;

    /// Publishes the "visible of total" summary caption.
    fn set_summary(&mut self, caption: &str);
}

/// A released key, as far as request handling cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    /// F1..F24
    Function(u8),
    Other,
}

impl Key {
    /// Only printable characters and Backspace may start a search.
    pub fn edits_request(self) -> bool {
        match self {
            Key::Char(c) => !c.is_control() && !c.is_whitespace(),
            Key::Backspace => true,
            Key::Enter | Key::Function(_) | Key::Other => false,
        }
    }
}

/// Inclusive bounds on the query length, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub min: usize,
    pub max: usize,
}

impl RequestLimits {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, request: &str) -> Result<()> {
        let len = request.chars().count();
        let bound = if len < self.min {
            LengthBound::TooShort { min: self.min }
        } else if len > self.max {
            LengthBound::TooLong { max: self.max }
        } else {
            return Ok(());
        };
        Err(TreefindError::InvalidInputLength { bound, len })
    }
}

impl From<&SearchSettings> for RequestLimits {
    fn from(settings: &SearchSettings) -> Self {
        Self::new(settings.min_request_length, settings.max_request_length)
    }
}

/// In-memory input, for hosts that feed text programmatically.
#[derive(Debug, Clone, Default)]
pub struct BufferedInput {
    text: String,
    message: Option<String>,
    summary: String,
}

impl BufferedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl InputCollaborator for BufferedInput {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn show_message(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }

    fn hide_message(&mut self) {
        self.message = None;
    }

    fn is_message_shown(&self) -> bool {
        self.message.is_some()
    }

    fn set_summary(&mut self, caption: &str) {
        self.summary = caption.to_string();
    }
}

//! Capabilities the editing engine consumes from its host.
//!
//! The editor never reaches back into a UI. It is handed a [`ViewPort`] for
//! scroll state, a [`MessageSink`] for the status line and a [`Grammar`]
//! descriptor for indentation hints.

use std::fmt;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

/// Text shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}", self.text),
            Severity::Warning => write!(f, "warning: {}", self.text),
            Severity::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// The visible window onto the document.
pub trait ViewPort {
    /// Visible text rows.
    fn rows(&self) -> usize;
    /// Visible text columns.
    fn cols(&self) -> usize;
    fn scroll_row(&self) -> usize;
    fn scroll_col(&self) -> usize;
    fn set_scroll(&mut self, row: usize, col: usize);
    /// Called after an edit changes the row count.
    fn document_resized(&mut self, _rows: usize) {}
}

/// The single slot user-visible failures and notices go through.
pub trait MessageSink {
    fn set_message(&mut self, message: Option<StatusMessage>);
}

/// A [`MessageSink`] that keeps the latest message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    message: Option<StatusMessage>,
}

impl StatusLine {
    pub const fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn take(&mut self) -> Option<StatusMessage> {
        self.message.take()
    }
}

impl MessageSink for StatusLine {
    fn set_message(&mut self, message: Option<StatusMessage>) {
        self.message = message;
    }
}

/// Root grammar descriptor for the open document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub name: String,
    /// Indent unit for carriage-return auto-indent; `None` disables it.
    pub indent: Option<String>,
}

impl Grammar {
    pub fn plain() -> Self {
        Self {
            name: "text".to_owned(),
            indent: None,
        }
    }

    pub fn with_indent(name: impl Into<String>, indent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indent: Some(indent.into()),
        }
    }

    /// Pick a grammar from a file extension.
    pub fn for_extension(extension: &str) -> Self {
        match extension {
            "py" => Self::with_indent("python", "    "),
            "rs" => Self::with_indent("rust", "    "),
            "c" | "cc" | "cpp" | "h" | "hpp" | "js" | "ts" | "json" | "java" | "go" => {
                Self::with_indent(extension, "  ")
            }
            "sh" | "bash" => Self::with_indent("shell", "  "),
            _ => Self::plain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_keeps_latest() {
        let mut line = StatusLine::default();
        line.set_message(Some(StatusMessage::info("one")));
        line.set_message(Some(StatusMessage::error("two")));
        assert_eq!(line.message().map(|m| m.severity), Some(Severity::Error));
        assert_eq!(line.take().map(|m| m.text), Some("two".to_owned()));
        assert!(line.message().is_none());
    }

    #[test]
    fn test_display_prefixes_severity() {
        assert_eq!(StatusMessage::warning("x").to_string(), "warning: x");
        assert_eq!(StatusMessage::info("x").to_string(), "x");
    }

    #[test]
    fn test_grammar_for_extension() {
        assert_eq!(Grammar::for_extension("py").indent.as_deref(), Some("    "));
        assert_eq!(Grammar::for_extension("md").indent, None);
    }
}

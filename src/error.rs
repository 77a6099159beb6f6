use crate::parser::positions::line_col;
use std::fmt;

/// Kind of tokenize error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnclosedTag,
    UnclosedEchoTag,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnclosedTag => "Unclosed tag",
            ErrorKind::UnclosedEchoTag => "Unclosed echo tag",
        }
    }
}

/// Structural error found while tokenizing a template.
///
/// Carried in [`TokenizeResult::error`](crate::parser::tokenizer::TokenizeResult)
/// rather than returned as `Err`: tokenization always yields its best-effort
/// token list alongside the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    pub kind: ErrorKind,
    /// Byte offset of the opening `{{` of the failing construct.
    pub position: usize,
}

impl TemplateError {
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        // Red for the error itself, dim for structural chrome
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let (line, col) = line_col(source, self.position);
        let mut output = String::new();

        output.push('\n');
        output.push_str(&format!(" file: {}:{}:{}\n", filename, line + 1, col + 1));
        output.push_str(&format!("{}error:{} {}\n", red, reset, self.kind.as_str()));

        if let Some(source_line) = source.lines().nth(line) {
            let line_num = line + 1;
            let width = format!("{}", line_num).len().max(2);
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}\n",
                dim, line_num, reset, source_line,
                width = width
            ));
            let spaces = " ".repeat(col);
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}^^{}\n",
                dim, "", reset, spaces, red, reset,
                width = width
            ));
        }

        output.push('\n');
        output
    }
}

impl serde::Serialize for TemplateError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TemplateError", 2)?;
        s.serialize_field("message", self.kind.as_str())?;
        s.serialize_field("position", &self.position)?;
        s.end()
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())
    }
}

impl std::error::Error for TemplateError {}

/// Error while rewriting the code inside one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The embedded expression does not parse as JavaScript.
    Syntax { offset: usize, snippet: String },
    /// Invariant violated (non-program or empty parse); signals a tokenizer
    /// bug upstream, not a user error.
    Internal(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Syntax { offset, snippet } => {
                write!(f, "Invalid expression at byte {}: `{}`", offset, snippet)
            }
            TransformError::Internal(msg) => write!(f, "Internal transform error: {}", msg),
        }
    }
}

impl std::error::Error for TransformError {}

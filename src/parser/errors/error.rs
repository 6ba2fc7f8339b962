//! Syntax and lexing error types

use thiserror::Error;

use crate::base::{TextRange, TextSize};

use super::codes::ErrorCode;

/// A syntax error with its location and code.
///
/// Syntax errors are plain values collected by the parser; they are turned
/// into diagnostics by the semantic layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Source location
    pub range: TextRange,
    /// Categorized error code
    pub code: ErrorCode,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            hint: None,
        }
    }

    /// Create an error at a specific offset with zero-width range
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        let code = err.code();
        let range = err.range();
        SyntaxError::new(err.to_string(), range, code)
    }
}

/// A failure of the tokenizer. Lexing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A line dedents to a column no enclosing block started at.
    #[error("indentation of {width} does not match any enclosing block")]
    IndentationError { offset: TextSize, width: u32 },

    /// Text the base lexer has no token for.
    #[error("unexpected character sequence '{text}'")]
    UnknownToken { text: String, range: TextRange },
}

impl LexError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LexError::IndentationError { .. } => ErrorCode::E0105,
            LexError::UnknownToken { text, .. } if text.starts_with('"') => ErrorCode::E0102,
            LexError::UnknownToken { .. } => ErrorCode::E0101,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            LexError::IndentationError { offset, .. } => TextRange::empty(*offset),
            LexError::UnknownToken { range, .. } => *range,
        }
    }
}

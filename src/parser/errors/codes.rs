//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens, indentation)
//! - E02xx: Layout errors (line ends, blocks, list items)
//! - E03xx: Property errors (missing, unknown, duplicate, invalid values)
//! - E04xx: Join-condition errors
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string literal
    E0102,
    /// Dedent to a column that matches no enclosing block
    E0105,

    // =========================================================================
    // E02xx: Layout errors
    // =========================================================================
    /// Content after a complete property
    E0201,
    /// Missing indented block after `key:`
    E0202,
    /// Expected a `- ` list item
    E0203,

    // =========================================================================
    // E03xx: Property errors
    // =========================================================================
    /// Property key without a value
    E0301,
    /// Key not allowed in this block
    E0302,
    /// Property given twice in one block
    E0303,
    /// Value of the wrong kind
    E0304,

    // =========================================================================
    // E04xx: Join-condition errors
    // =========================================================================
    /// Malformed join condition
    E0401,
    /// Unknown comparison operator
    E0403,

    // =========================================================================
    // E09xx: Generic errors
    // =========================================================================
    /// Unexpected token
    E0901,
    /// Expected a specific token
    E0902,
    /// Missing or unknown root keyword
    E0903,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0105 => "E0105",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0401 => "E0401",
            Self::E0403 => "E0403",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
            Self::E0903 => "E0903",
        }
    }

    /// Get a human-readable category description
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 | Self::E0105 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 => "layout error",
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 => "property error",
            Self::E0401 | Self::E0403 => "join condition error",
            Self::E0901 | Self::E0902 | Self::E0903 => "syntax error",
        }
    }

    /// Get the default error message for this code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0105 => "inconsistent indentation",
            Self::E0201 => "expected end of line",
            Self::E0202 => "expected an indented block",
            Self::E0203 => "expected a list item",
            Self::E0301 => "missing value",
            Self::E0302 => "unknown property",
            Self::E0303 => "duplicate property",
            Self::E0304 => "invalid value",
            Self::E0401 => "invalid join condition",
            Self::E0403 => "invalid comparison operator",
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
            Self::E0903 => "expected 'entity', 'relationship', 'mapping' or 'systemDiagram'",
        }
    }

    /// Lexical errors stop the parse; everything else is recovered from.
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::E0101 | Self::E0102 | Self::E0105)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Diagnostics: validation and parse problem reporting.
//!
//! Every user-facing problem ends up as a [`Diagnostic`]: parse errors are
//! converted when a document is validated, validation rules add their own.
//! Diagnostics are data; nothing here is ever raised as an error.

use std::sync::Arc;

use crate::base::{FileId, LineCol, LineIndex, TextRange};
use crate::parser::{Property, SyntaxError};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
        }
    }
}

/// A diagnostic message attached to a range of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    /// Byte range the diagnostic points at.
    pub range: TextRange,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// The property of the offending node, when the problem is tied to one.
    pub property: Option<Property>,
}

impl Diagnostic {
    fn new(file: FileId, range: TextRange, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            range,
            severity,
            code: None,
            message: message.into(),
            property: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, range, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, range, Severity::Warning, message)
    }

    /// Create a new info diagnostic.
    pub fn info(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, range, Severity::Info, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the property the diagnostic is attached to.
    pub fn with_property(mut self, property: Property) -> Self {
        self.property = Some(property);
        self
    }

    /// A parse error of `file` as a diagnostic.
    pub fn from_syntax_error(file: FileId, error: &SyntaxError) -> Self {
        let message = match &error.hint {
            Some(hint) => format!("{} ({hint})", error.message),
            None => error.message.clone(),
        };
        Self::error(file, error.range, message).with_code(error.code.as_str())
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Start position of the diagnostic.
    pub fn start(&self, line_index: &LineIndex) -> LineCol {
        line_index.line_col(self.range.start())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes of the validator.
///
/// ## Code Ranges
///
/// - **E0001-E0019**: Linking and identity errors
/// - **E0020-E0099**: Model rule violations
/// - **W0001-W0099**: Warnings (conventions, redundancy)
///
/// Parse errors keep the `E01xx`-`E09xx` codes of the parser.
pub mod codes {
    // ========================================================================
    // LINKING AND IDENTITY (E0001-E0019)
    // ========================================================================

    /// Reference that did not resolve.
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Global id used by more than one node.
    pub const DUPLICATE_ID: &str = "E0004";
    /// Node without an id where one is required.
    pub const MISSING_ID: &str = "E0005";
    /// Entity inheritance cycle.
    pub const INHERITANCE_CYCLE: &str = "E0007";

    // ========================================================================
    // MODEL RULES (E0020-E0099)
    // ========================================================================

    /// Sibling id used twice inside a diagram or mapping.
    pub const DUPLICATE_LOCAL_ID: &str = "E0020";
    /// Relationship attribute not owned by the relationship's entity.
    pub const FOREIGN_RELATIONSHIP_ATTRIBUTE: &str = "E0021";
    /// Relationship attribute referenced by more than one pair.
    pub const RELATIONSHIP_ATTRIBUTE_REUSED: &str = "E0022";
    /// Second `from` source object in one mapping.
    pub const MULTIPLE_FROM_SOURCES: &str = "E0023";
    /// `from` source object with dependencies.
    pub const FROM_WITH_DEPENDENCIES: &str = "E0024";
    /// Dependency on itself or on a source outside the document.
    pub const INVALID_DEPENDENCY: &str = "E0025";
    /// Expression token matching no declared source.
    pub const UNDECLARED_EXPRESSION_SOURCE: &str = "E0026";
    /// Target attribute mapped more than once.
    pub const TARGET_ATTRIBUTE_REMAPPED: &str = "E0027";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// File name does not match the root id.
    pub const FILENAME_MISMATCH: &str = "W0003";
    /// Same dependency listed twice.
    pub const DUPLICATE_DEPENDENCY: &str = "W0004";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics for one document.
#[derive(Clone, Debug)]
pub struct DiagnosticCollector {
    file: FileId,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            diagnostics: Vec::new(),
        }
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an error with a code, optionally tied to a property.
    pub fn error(
        &mut self,
        range: TextRange,
        code: &'static str,
        property: Option<Property>,
        message: impl Into<Arc<str>>,
    ) {
        let mut diagnostic = Diagnostic::error(self.file, range, message).with_code(code);
        diagnostic.property = property;
        self.add(diagnostic);
    }

    /// Add a warning with a code, optionally tied to a property.
    pub fn warning(
        &mut self,
        range: TextRange,
        code: &'static str,
        property: Option<Property>,
        message: impl Into<Arc<str>>,
    ) {
        let mut diagnostic = Diagnostic::warning(self.file, range, message).with_code(code);
        diagnostic.property = property;
        self.add(diagnostic);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Consume the collector, returning diagnostics sorted by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.range.start(), d.range.end()));
        self.diagnostics
    }
}

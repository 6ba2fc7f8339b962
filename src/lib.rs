//! # crossmodel-base
//!
//! Core library for the CrossModel language: indentation-aware lexing,
//! parsing, scoping, linking, serialization and validation of `.cm` models.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost (build queue), model-service payloads
//!   ↓
//! hir       → Ids, symbol index, scopes, linking, validation, builds
//!   ↓
//! project   → Package registry, workspace loading
//!   ↓
//! syntax    → File types, id escaping, serializer
//!   ↓
//! parser    → Logos lexer, indentation layer, recursive-descent parser, AST
//!   ↓
//! base      → Primitives (FileId, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → project → hir → ide)
// ============================================================================

/// Foundation types: FileId, TextRange, LineIndex
pub mod base;

/// Parser: Logos lexer, INDENT/DEDENT synthesis, typed AST arena
pub mod parser;

/// Syntax: file types, identifier escaping, AST → text
pub mod syntax;

/// High-level IR: scopes, linking, validation, document builds
pub mod hir;

/// IDE entry points: AnalysisHost, model-service payloads
pub mod ide;

/// Project management: packages, workspace loading
pub mod project;

// Re-export commonly needed items
pub use parser::is_keyword;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};

pub use hir::{BuildOutcome, Diagnostic, DocumentState, Severity, Workspace};
pub use ide::{Analysis, AnalysisHost};
pub use parser::{Ast, NodeKind, parse};
pub use project::{PackageRegistry, WorkspaceLoader};
pub use syntax::{SerializerOptions, SyntaxFile, serialize};

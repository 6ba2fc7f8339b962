//! High-level IR (HIR): the semantic model of a workspace.
//!
//! Documents are parsed once and then moved through a fixed sequence of
//! build phases. Every phase runs over the whole batch before the next one
//! starts.
//!
//! ## Key Types
//!
//! - [`Workspace`]: documents, package registry and symbol index
//! - [`Document`]: one parsed file plus everything computed for it
//! - [`SymbolIndex`]: workspace-wide exported descriptions
//! - [`ScopeProvider`]: reference candidates and resolution
//! - [`LinkTable`]: resolution result of every reference of a document
//! - [`Diagnostic`]: syntax and semantic problems
//!
//! ## Build Phases
//!
//! ```text
//! Parsed             ← INPUT: parsed syntax file
//!     │
//!     ▼
//! IndexedContent     ← local ids, exports, local scopes (changed documents)
//!     │
//!     ▼
//! ComputedScopes     ← derived attributes (all documents)
//!     │
//!     ▼
//! Linked             ← every reference resolved or marked unresolved
//!     │
//!     ▼
//! Validated          ← diagnostics
//! ```

mod build;
mod diagnostics;
mod ids;
mod link;
mod resolve;
mod scope;
mod symbols;
mod validate;

pub use build::{BuildOutcome, Document, DocumentState, ValidationOptions, Workspace};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use ids::{
    IdStack, compute_local_ids, find_next_id, global_id, identified_owner, local_id, next_free_id,
    node_id,
};
pub use link::{LinkTable, Linked, RefSite, link_document};
pub use resolve::{ReferenceContext, ScopeProvider};
pub use scope::{
    LocalScopes, compute_derived, compute_exports, compute_local_scopes, derived_exports,
    derived_kind, is_diagram_content,
};
pub use symbols::{
    DerivedAttribute, Description, NodeHandle, NodeRef, SymbolIndex, Visibility,
};
pub use validate::{find_inheritance_cycle, validate_document};

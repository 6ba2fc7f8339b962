//! AnalysisHost and Analysis: the build queue and read snapshots.
//!
//! The `AnalysisHost` owns the workspace behind a mutex. Changes and builds
//! take the lock, so two builds never overlap and a change arriving during a
//! build is folded into the next one.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new();
//!
//! // Apply file changes
//! host.set_file_content("/ws/Customer.entity.cm", text);
//!
//! // Build and query a consistent snapshot
//! let analysis = host.analysis();
//! let diagnostics = analysis.diagnostics(file_id);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::model_service::to_client_model;
use crate::base::{FileId, TextRange, TextSize};
use crate::hir::{
    BuildOutcome, Diagnostic, Document, NodeHandle, NodeRef, ReferenceContext, RefSite,
    ValidationOptions, Workspace,
};
use crate::parser::{NodeId, NodeKind, Property};
use crate::project::{PackageInfo, ProjectError};
use crate::syntax::{SerializerOptions, SyntaxFile, serialize};

/// Owns all mutable state of the language core.
///
/// Apply changes via `set_file_content()` and `remove_file()`, then get a
/// consistent snapshot via `analysis()`.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    workspace: Mutex<Workspace>,
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            workspace: Mutex::new(Workspace::with_options(options)),
        }
    }

    /// Parse `text` and store it as the content of `path`.
    pub fn set_file_content(&self, path: impl Into<PathBuf>, text: &str) -> FileId {
        self.workspace.lock().set_file_text(path, text)
    }

    /// Store an already parsed file.
    pub fn set_file(&self, path: PathBuf, text: Arc<str>, file: SyntaxFile) -> FileId {
        self.workspace.lock().set_file(path, text, file)
    }

    /// Remove a file. Returns whether it was present.
    pub fn remove_file(&self, path: &Path) -> bool {
        self.workspace.lock().remove_file(path).is_some()
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.workspace.lock().file_id(path).is_some()
    }

    pub fn file_count(&self) -> usize {
        self.workspace.lock().len()
    }

    pub fn register_package(&self, info: PackageInfo) -> SmolStr {
        self.workspace.lock().register_package(info)
    }

    /// Read and register the `package.json` at `descriptor`.
    pub fn load_package(&self, descriptor: &Path) -> Result<SmolStr, ProjectError> {
        self.workspace.lock().load_package(descriptor)
    }

    pub fn set_options(&self, options: ValidationOptions) {
        self.workspace.lock().set_options(options);
    }

    /// Build pending documents; stops between phases once `cancel` fires.
    pub fn build(&self, cancel: &CancellationToken) -> BuildOutcome {
        self.workspace.lock().build(cancel)
    }

    /// Build pending documents and return a snapshot of the result.
    pub fn analysis(&self) -> Analysis<'_> {
        let mut workspace = self.workspace.lock();
        workspace.build(&CancellationToken::new());
        Analysis { workspace }
    }
}

/// A consistent, read-only view of the workspace.
///
/// Holds the workspace lock; drop it before applying further changes.
pub struct Analysis<'a> {
    workspace: MutexGuard<'a, Workspace>,
}

impl Analysis<'_> {
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.workspace.file_id(path)
    }

    pub fn document(&self, file: FileId) -> Option<&Document> {
        self.workspace.document(file)
    }

    /// Diagnostics of one document, sorted by position.
    pub fn diagnostics(&self, file: FileId) -> &[Diagnostic] {
        self.document(file).map_or(&[], |d| d.diagnostics.as_slice())
    }

    /// Diagnostics of every document.
    pub fn all_diagnostics(&self) -> Vec<(PathBuf, Diagnostic)> {
        self.workspace
            .documents()
            .flat_map(|d| d.diagnostics.iter().map(|diag| (d.path.clone(), diag.clone())))
            .collect()
    }

    /// Serialize a document with the given layout.
    pub fn serialize(&self, file: FileId, options: &SerializerOptions) -> Option<String> {
        self.document(file).map(|d| serialize(d.ast(), options))
    }

    /// Client payload of a document.
    pub fn client_model(&self, file: FileId) -> Option<serde_json::Value> {
        self.document(file).map(|d| to_client_model(d.ast()))
    }

    /// Unique id for a new diagram node, edge or mapping source below
    /// `container`. `None` when `container` is not part of `file`.
    pub fn propose_node_id(
        &self,
        file: FileId,
        container: NodeId,
        kind: NodeKind,
        proposal: &str,
    ) -> Option<SmolStr> {
        self.workspace.find_next_id(file, container, kind, proposal)
    }

    /// Unique id for a new root-level element of `kind`.
    pub fn propose_global_id(&self, kind: NodeKind, proposal: &str, exclude: Option<FileId>) -> SmolStr {
        self.workspace.find_next_global_id(kind, proposal, exclude)
    }

    /// Names a reference slot could be set to, in precedence order. Empty
    /// when `node` is not part of `file`.
    pub fn reference_candidates(&self, file: FileId, node: NodeId, property: Property) -> Vec<SmolStr> {
        let context = ReferenceContext::new(file, node, property);
        self.workspace
            .scope_provider()
            .candidates(&context)
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    /// Declaration of the reference under `offset`.
    pub fn goto_definition(&self, file: FileId, offset: TextSize) -> Option<(FileId, TextRange)> {
        let document = self.document(file)?;
        let ast = document.ast();
        let site = ast.ids().find_map(|node| {
            ast.node(node)
                .references()
                .into_iter()
                .find(|(_, _, reference)| reference.range.contains_inclusive(offset))
                .map(|(property, index, _)| RefSite::new(node, property, index))
        })?;
        let target = document.links.get(site)?.target()?;
        self.declaration(target)
    }

    /// Where the node behind `handle` is written. Derived attributes point at
    /// the entity attribute they were cloned from.
    pub fn declaration(&self, handle: NodeHandle) -> Option<(FileId, TextRange)> {
        let document = self.document(handle.file)?;
        match handle.node {
            NodeRef::Authored(node) => {
                let ast = document.ast();
                ast.contains(node).then(|| (handle.file, ast.range(node)))
            }
            NodeRef::Derived(index) => {
                let source = document.derived.get(index as usize)?.source;
                self.declaration(source)
            }
        }
    }
}

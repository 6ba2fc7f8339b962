//! Documents, the workspace and phased builds.
//!
//! A build moves every pending document through the same phases, one phase
//! at a time for the whole batch:
//!
//! ```text
//! Parsed → IndexedContent → ComputedScopes → Linked → Validated
//! ```
//!
//! Exports of all documents are in the index before any resolution runs, so
//! scope computation and validation always see a consistent snapshot.
//! Cancellation is checked between phases.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::diagnostics::Diagnostic;
use super::ids::{compute_local_ids, find_next_id, next_free_id};
use super::link::{LinkTable, link_document};
use super::resolve::ScopeProvider;
use super::scope::{LocalScopes, compute_derived, compute_exports, compute_local_scopes, derived_exports};
use super::symbols::{DerivedAttribute, Description, NodeHandle, NodeRef, SymbolIndex, Visibility};
use super::validate::validate_document;
use crate::base::FileId;
use crate::parser::{Ast, EntityAttribute, Node, NodeId, NodeKind};
use crate::project::{PackageInfo, PackageRegistry};
use crate::syntax::SyntaxFile;

/// Lifecycle of a document. Later states imply the earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentState {
    Parsed,
    IndexedContent,
    ComputedScopes,
    Linked,
    Validated,
}

/// Validator switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Warn when a file name does not match its root id.
    pub filename_convention: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            filename_convention: true,
        }
    }
}

/// Result of [`Workspace::build`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every document reached `Validated`.
    Completed { documents: usize },
    /// The token fired; documents stopped after `completed`.
    Cancelled { completed: DocumentState },
}

/// One parsed document and everything computed for it.
#[derive(Clone, Debug)]
pub struct Document {
    pub file: FileId,
    pub path: PathBuf,
    pub text: Arc<str>,
    pub syntax: SyntaxFile,
    pub state: DocumentState,
    pub package_id: SmolStr,
    pub package_reference: SmolStr,
    pub local_ids: FxHashMap<NodeId, SmolStr>,
    pub scopes: LocalScopes,
    pub derived: Vec<DerivedAttribute>,
    pub links: LinkTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    fn new(file: FileId, path: PathBuf, text: Arc<str>, syntax: SyntaxFile) -> Self {
        Self {
            file,
            path,
            text,
            syntax,
            state: DocumentState::Parsed,
            package_id: SmolStr::default(),
            package_reference: SmolStr::default(),
            local_ids: FxHashMap::default(),
            scopes: LocalScopes::default(),
            derived: Vec::new(),
            links: LinkTable::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn ast(&self) -> &Ast {
        self.syntax.ast()
    }

    pub fn local_id(&self, node: NodeId) -> Option<&SmolStr> {
        self.local_ids.get(&node)
    }

    /// File name up to the first `.`, e.g. `Customer` for `Customer.entity.cm`.
    pub fn base_name(&self) -> Option<&str> {
        let name = self.path.file_name()?.to_str()?;
        name.split('.').next()
    }
}

/// All documents of a workspace, the package registry and the symbol index.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: IndexMap<FileId, Document>,
    paths: FxHashMap<PathBuf, FileId>,
    next_file: u32,
    packages: PackageRegistry,
    index: SymbolIndex,
    options: ValidationOptions,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ValidationOptions) {
        self.options = options;
        self.invalidate_peers();
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    /// Parse `text` and add or replace the document at `path`.
    pub fn set_file_text(&mut self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> FileId {
        let path = path.into();
        let text = text.into();
        let syntax = SyntaxFile::new(&path.to_string_lossy(), &text);
        self.set_file(path, text, syntax)
    }

    /// Add or replace a document with an already parsed file.
    pub fn set_file(&mut self, path: PathBuf, text: Arc<str>, syntax: SyntaxFile) -> FileId {
        let file = match self.paths.get(&path) {
            Some(&file) => file,
            None => {
                let file = FileId::new(self.next_file);
                self.next_file += 1;
                self.paths.insert(path.clone(), file);
                file
            }
        };
        self.index.remove_file(file);
        self.documents
            .insert(file, Document::new(file, path, text, syntax));
        self.invalidate_peers();
        file
    }

    /// Remove the document at `path` together with its exports.
    pub fn remove_file(&mut self, path: &Path) -> Option<FileId> {
        let file = self.paths.remove(path)?;
        self.documents.shift_remove(&file);
        self.index.remove_file(file);
        self.invalidate_peers();
        Some(file)
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.paths.get(path).copied()
    }

    pub fn document(&self, file: FileId) -> Option<&Document> {
        self.documents.get(&file)
    }

    pub fn document_by_path(&self, path: &Path) -> Option<&Document> {
        self.file_id(path).and_then(|file| self.document(file))
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // ------------------------------------------------------------------------
    // Packages
    // ------------------------------------------------------------------------

    pub fn packages(&self) -> &PackageRegistry {
        &self.packages
    }

    /// Register a package; every document is re-indexed on the next build.
    pub fn register_package(&mut self, info: PackageInfo) -> SmolStr {
        let id = self.packages.register(info);
        self.reindex_all();
        id
    }

    /// Read and register a `package.json`.
    pub fn load_package(&mut self, descriptor: &Path) -> Result<SmolStr, crate::project::ProjectError> {
        let id = self.packages.load_descriptor(descriptor)?;
        self.reindex_all();
        Ok(id)
    }

    pub fn remove_package(&mut self, directory: &Path) -> Option<PackageInfo> {
        let removed = self.packages.remove_directory(directory);
        if removed.is_some() {
            self.reindex_all();
        }
        removed
    }

    fn reindex_all(&mut self) {
        for document in self.documents.values_mut() {
            document.state = DocumentState::Parsed;
        }
    }

    /// Drop every document back to `IndexedContent` at most; derived
    /// attributes, links and diagnostics depend on all peers.
    fn invalidate_peers(&mut self) {
        for document in self.documents.values_mut() {
            if document.state > DocumentState::IndexedContent {
                document.state = DocumentState::IndexedContent;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Index and resolution
    // ------------------------------------------------------------------------

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    pub fn scope_provider(&self) -> ScopeProvider<'_> {
        ScopeProvider::new(&self.documents, &self.index, &self.packages)
    }

    /// The entity attribute behind an authored or derived attribute handle.
    pub fn attribute(&self, handle: NodeHandle) -> Option<&EntityAttribute> {
        let document = self.document(handle.file)?;
        match handle.node {
            NodeRef::Authored(node) => match document.ast().node(node) {
                Node::EntityAttribute(attribute) => Some(attribute),
                _ => None,
            },
            NodeRef::Derived(index) => {
                let source = document.derived.get(index as usize)?.source;
                self.attribute(source)
            }
        }
    }

    /// Every diagnostic of the last build, per document order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.documents.values().flat_map(|d| d.diagnostics.iter())
    }

    // ------------------------------------------------------------------------
    // Id proposals
    // ------------------------------------------------------------------------

    /// Unique id for a new node of `kind` below `container` of `file`.
    pub fn find_next_id(&self, file: FileId, container: NodeId, kind: NodeKind, proposal: &str) -> Option<SmolStr> {
        let document = self.document(file)?;
        let ast = document.ast();
        if !ast.contains(container) {
            return None;
        }
        Some(find_next_id(ast, container, kind, proposal))
    }

    /// Unique id for a new exported node of `kind` across the whole index.
    ///
    /// Descriptions of `exclude` are ignored so that renaming a node does not
    /// collide with itself.
    pub fn find_next_global_id(&self, kind: NodeKind, proposal: &str, exclude: Option<FileId>) -> SmolStr {
        let taken = |candidate: &str| {
            self.index.lookup(candidate).iter().any(|d| {
                d.kind == kind && d.visibility == Visibility::Package && Some(d.file()) != exclude
            })
        };
        next_free_id(proposal, taken)
    }

    // ------------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------------

    /// Bring every document to `Validated`.
    pub fn build(&mut self, cancel: &CancellationToken) -> BuildOutcome {
        let pending = self
            .documents
            .values()
            .filter(|d| d.state < DocumentState::Validated)
            .count();
        if pending == 0 {
            return BuildOutcome::Completed { documents: 0 };
        }
        tracing::debug!(documents = self.documents.len(), pending, "build started");

        // Phase 1: exports and authored local scopes of changed documents
        if cancel.is_cancelled() {
            return BuildOutcome::Cancelled {
                completed: DocumentState::Parsed,
            };
        }
        self.index_content();

        // Phase 2: derived attributes, every document
        if cancel.is_cancelled() {
            return BuildOutcome::Cancelled {
                completed: DocumentState::IndexedContent,
            };
        }
        self.compute_scopes();

        // Phase 3: links
        if cancel.is_cancelled() {
            return BuildOutcome::Cancelled {
                completed: DocumentState::ComputedScopes,
            };
        }
        self.link();

        // Phase 4: validation
        if cancel.is_cancelled() {
            return BuildOutcome::Cancelled {
                completed: DocumentState::Linked,
            };
        }
        self.validate();

        let documents = self.documents.len();
        tracing::info!(
            documents,
            symbols = self.index.len(),
            diagnostics = self.diagnostics().count(),
            "build finished"
        );
        BuildOutcome::Completed { documents }
    }

    fn index_content(&mut self) {
        let mut exported = 0;
        for document in self.documents.values_mut() {
            if document.state >= DocumentState::IndexedContent {
                continue;
            }
            let file = document.file;
            document.package_id = self.packages.package_id_of(&document.path);
            document.package_reference = self.packages.package_reference_of(&document.path);
            document.local_ids = compute_local_ids(document.syntax.ast());
            document.scopes = compute_local_scopes(file, document.syntax.ast(), &document.local_ids);
            document.derived.clear();

            let exports = compute_exports(
                file,
                document.syntax.ast(),
                &document.local_ids,
                &document.package_id,
                &document.package_reference,
            );
            exported += exports.len();
            self.index.add_file(file, exports);
            document.state = DocumentState::IndexedContent;
        }
        tracing::debug!(exported, "phase IndexedContent done");
    }

    fn compute_scopes(&mut self) {
        // Stale clones must not take part in resolving entities
        for document in self.documents.values_mut() {
            self.index.remove_derived(document.file);
            document.scopes.clear_derived();
            document.derived.clear();
        }

        let provider = self.scope_provider();
        let computed: Vec<(FileId, Vec<DerivedAttribute>)> = self
            .documents
            .values()
            .map(|d| (d.file, compute_derived(&provider, d.file, d.ast(), &d.local_ids)))
            .collect();

        let mut derived_count = 0;
        for (file, derived) in computed {
            let Some(document) = self.documents.get_mut(&file) else {
                continue;
            };
            let exports: Vec<Description> = derived_exports(
                file,
                document.syntax.ast(),
                &derived,
                &document.package_id,
                &document.package_reference,
            );
            for description in exports {
                self.index.insert(description);
            }
            document
                .scopes
                .add_derived(file, document.syntax.ast(), &document.local_ids, &derived);
            derived_count += derived.len();
            document.derived = derived;
            document.state = DocumentState::ComputedScopes;
        }
        tracing::debug!(derived = derived_count, "phase ComputedScopes done");
    }

    fn link(&mut self) {
        let provider = self.scope_provider();
        let linked: Vec<(FileId, LinkTable)> = self
            .documents
            .values()
            .map(|d| (d.file, link_document(&provider, d.file, d.ast())))
            .collect();
        for (file, links) in linked {
            if let Some(document) = self.documents.get_mut(&file) {
                document.links = links;
                document.state = DocumentState::Linked;
            }
        }
        tracing::debug!(documents = self.documents.len(), "phase Linked done");
    }

    fn validate(&mut self) {
        let provider = self.scope_provider();
        let options = self.options;
        let validated: Vec<(FileId, Vec<Diagnostic>)> = self
            .documents
            .values()
            .map(|d| (d.file, validate_document(&provider, d, options)))
            .collect();
        for (file, diagnostics) in validated {
            if let Some(document) = self.documents.get_mut(&file) {
                document.diagnostics = diagnostics;
                document.state = DocumentState::Validated;
            }
        }
        tracing::debug!(documents = self.documents.len(), "phase Validated done");
    }
}

//! Symbol descriptions and the workspace-wide symbol index.
//!
//! A [`Description`] is what scope computation exports for a node: the name
//! it can be referenced by, its kind, and a [`NodeHandle`] to the node
//! itself. Every identified node is exported twice, once under its local id
//! tagged with the owning package id ([`Visibility::Package`]) and once under
//! its global id tagged with the package reference name
//! ([`Visibility::Global`]).

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::FileId;
use crate::parser::{NodeId, NodeKind};

// ============================================================================
// HANDLES
// ============================================================================

/// A node inside one document: authored by the parser or derived during
/// scope computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Authored(NodeId),
    /// Index into the document's derived attribute table.
    Derived(u32),
}

/// A node anywhere in the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle {
    pub file: FileId,
    pub node: NodeRef,
}

impl NodeHandle {
    pub fn authored(file: FileId, node: NodeId) -> Self {
        Self {
            file,
            node: NodeRef::Authored(node),
        }
    }

    pub fn derived(file: FileId, index: u32) -> Self {
        Self {
            file,
            node: NodeRef::Derived(index),
        }
    }

    pub fn authored_node(&self) -> Option<NodeId> {
        match self.node {
            NodeRef::Authored(node) => Some(node),
            NodeRef::Derived(_) => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.node, NodeRef::Derived(_))
    }
}

// ============================================================================
// DESCRIPTIONS
// ============================================================================

/// Which name form a description was exported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Local id, visible inside the owning package.
    Package,
    /// Global id, visible to packages depending on the owner.
    Global,
    /// Name relative to a container, visible below that container only.
    Local,
}

/// An exported (or locally scoped) name of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Description {
    pub name: SmolStr,
    pub kind: NodeKind,
    pub handle: NodeHandle,
    /// Package id for `Package` descriptions, package reference name for
    /// `Global` ones; empty for `Local`.
    pub package: SmolStr,
    pub visibility: Visibility,
}

impl Description {
    pub fn new(
        name: impl Into<SmolStr>,
        kind: NodeKind,
        handle: NodeHandle,
        package: impl Into<SmolStr>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            handle,
            package: package.into(),
            visibility,
        }
    }

    pub fn file(&self) -> FileId {
        self.handle.file
    }
}

// ============================================================================
// SYMBOL INDEX
// ============================================================================

/// All exported descriptions of the workspace, looked up by name.
///
/// Mutated only while a build runs its IndexedContent and ComputedScopes
/// phases; resolution and validation read it afterwards.
#[derive(Clone, Debug, Default)]
pub struct SymbolIndex {
    /// Name -> descriptions, in insertion order.
    by_name: IndexMap<SmolStr, Vec<Description>>,
    /// File -> names it contributed.
    by_file: FxHashMap<FileId, FxHashSet<SmolStr>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every description of `file`.
    pub fn add_file(&mut self, file: FileId, descriptions: Vec<Description>) {
        self.remove_file(file);
        for description in descriptions {
            self.insert(description);
        }
    }

    pub fn insert(&mut self, description: Description) {
        self.by_file
            .entry(description.file())
            .or_default()
            .insert(description.name.clone());
        self.by_name
            .entry(description.name.clone())
            .or_default()
            .push(description);
    }

    /// Remove all descriptions of a file.
    pub fn remove_file(&mut self, file: FileId) {
        self.remove_where(file, |_| true);
    }

    /// Remove the derived-attribute descriptions of a file.
    pub fn remove_derived(&mut self, file: FileId) {
        self.remove_where(file, |d| d.handle.is_derived());
    }

    fn remove_where(&mut self, file: FileId, pred: impl Fn(&Description) -> bool) {
        let Some(names) = self.by_file.remove(&file) else {
            return;
        };
        let mut kept = FxHashSet::default();
        for name in names {
            let Some(list) = self.by_name.get_mut(&name) else {
                continue;
            };
            list.retain(|d| d.file() != file || !pred(d));
            if list.iter().any(|d| d.file() == file) {
                kept.insert(name.clone());
            }
            if list.is_empty() {
                self.by_name.shift_remove(&name);
            }
        }
        if !kept.is_empty() {
            self.by_file.insert(file, kept);
        }
    }

    /// Every description exported under `name`.
    pub fn lookup(&self, name: &str) -> &[Description] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Descriptions contributed by `file`.
    pub fn descriptions_in_file(&self, file: FileId) -> Vec<&Description> {
        self.by_file
            .get(&file)
            .into_iter()
            .flatten()
            .flat_map(|name| self.lookup(name))
            .filter(|d| d.file() == file)
            .collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Description> {
        self.by_name.values().flatten()
    }

    /// Number of descriptions.
    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }
}

// ============================================================================
// DERIVED ATTRIBUTES
// ============================================================================

/// An entity attribute virtualized onto an entity node, source object or
/// target object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedAttribute {
    /// `EntityNodeAttribute`, `SourceObjectAttribute` or `TargetObjectAttribute`.
    pub kind: NodeKind,
    /// The referencing node that owns the clone.
    pub owner: NodeId,
    /// Attribute id, copied from the entity attribute.
    pub id: SmolStr,
    /// Name the clone is registered under.
    pub local_id: SmolStr,
    /// The entity attribute the clone was copied from.
    pub source: NodeHandle,
}

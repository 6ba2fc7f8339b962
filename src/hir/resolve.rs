//! Scope provider: reference candidates and resolution.
//!
//! Candidates for a reference are collected in three layers, first match
//! wins:
//!
//! 1. **local**: container scopes from the referencing node upwards
//! 2. **project**: package-local exports of the referencing document's
//!    package (same document only when the package is unknown)
//! 3. **dependency**: global exports of every package visible from the
//!    referencing package
//!
//! Every layer is filtered by the node kind the reference slot expects.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::build::Document;
use super::symbols::{Description, NodeHandle, NodeRef, SymbolIndex, Visibility};
use crate::base::FileId;
use crate::base::constants::UNKNOWN_PACKAGE_ID;
use crate::parser::{Node, NodeId, NodeKind, Property, expected_reference_kind};
use crate::project::PackageRegistry;

/// The slot a reference is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceContext {
    pub file: FileId,
    pub node: NodeId,
    pub property: Property,
}

impl ReferenceContext {
    pub fn new(file: FileId, node: NodeId, property: Property) -> Self {
        Self {
            file,
            node,
            property,
        }
    }
}

/// Collects matching descriptions, dropping repeats of one name/node pair.
struct Candidates<'n> {
    expected: NodeKind,
    name: Option<&'n str>,
    first_only: bool,
    seen: FxHashSet<(SmolStr, NodeHandle)>,
    found: Vec<Description>,
}

impl Candidates<'_> {
    /// Offer a description; returns true once collection can stop.
    fn offer(&mut self, description: &Description) -> bool {
        if description.kind != self.expected
            || !self.name.is_none_or(|name| description.name == name)
        {
            return false;
        }
        if self
            .seen
            .insert((description.name.clone(), description.handle))
        {
            self.found.push(description.clone());
        }
        self.first_only && !self.found.is_empty()
    }
}

/// Read-only view of the workspace used for resolution.
#[derive(Clone, Copy)]
pub struct ScopeProvider<'a> {
    documents: &'a IndexMap<FileId, Document>,
    index: &'a SymbolIndex,
    packages: &'a PackageRegistry,
}

impl<'a> ScopeProvider<'a> {
    pub fn new(
        documents: &'a IndexMap<FileId, Document>,
        index: &'a SymbolIndex,
        packages: &'a PackageRegistry,
    ) -> Self {
        Self {
            documents,
            index,
            packages,
        }
    }

    pub fn document(&self, file: FileId) -> Option<&'a Document> {
        self.documents.get(&file)
    }

    pub fn index(&self) -> &'a SymbolIndex {
        self.index
    }

    pub fn packages(&self) -> &'a PackageRegistry {
        self.packages
    }

    /// Kind of the node behind a handle.
    pub fn kind_of(&self, handle: NodeHandle) -> Option<NodeKind> {
        let document = self.document(handle.file)?;
        match handle.node {
            NodeRef::Authored(node) => Some(document.ast().kind(node)),
            NodeRef::Derived(index) => document.derived.get(index as usize).map(|d| d.kind),
        }
    }

    /// Every candidate a reference in `context` could resolve to, in
    /// precedence order.
    pub fn candidates(&self, context: &ReferenceContext) -> Vec<Description> {
        self.collect(context, None, false)
    }

    /// The description `text` resolves to in `context`.
    pub fn resolve(&self, context: &ReferenceContext, text: &str) -> Option<Description> {
        let resolved = self.collect(context, Some(text), true).into_iter().next();
        tracing::trace!(
            reference = text,
            property = context.property.name(),
            resolved = resolved.is_some(),
            "resolve reference"
        );
        resolved
    }

    fn collect(&self, context: &ReferenceContext, name: Option<&str>, first_only: bool) -> Vec<Description> {
        let Some(document) = self.document(context.file) else {
            return Vec::new();
        };
        let ast = document.ast();
        let Some(owner) = ast.get(context.node).map(Node::kind) else {
            return Vec::new();
        };
        let Some(expected) = expected_reference_kind(owner, context.property) else {
            return Vec::new();
        };
        let mut candidates = Candidates {
            expected,
            name,
            first_only,
            seen: FxHashSet::default(),
            found: Vec::new(),
        };

        // Local scopes, innermost container first
        let mut current = Some(context.node);
        while let Some(container) = current {
            for description in document.scopes.get(container) {
                if candidates.offer(description) {
                    return candidates.found;
                }
            }
            current = ast.container(container);
        }

        // Mapping targets only see the attributes of their own target object
        if owner == NodeKind::AttributeMappingTarget {
            return candidates.found;
        }

        let exported: Vec<&Description> = match name {
            Some(name) => self.index.lookup(name).iter().collect(),
            None => self.index.all().collect(),
        };

        // Project scope
        let package = &document.package_id;
        for description in &exported {
            if description.visibility != Visibility::Package {
                continue;
            }
            let in_project = if package == UNKNOWN_PACKAGE_ID {
                description.file() == context.file
            } else {
                &description.package == package
            };
            if in_project && candidates.offer(description) {
                return candidates.found;
            }
        }

        // Dependency scope
        let visible = self.packages.visible_references(package);
        for description in &exported {
            if description.visibility == Visibility::Global
                && visible.contains(&description.package)
                && candidates.offer(description)
            {
                return candidates.found;
            }
        }

        tracing::trace!(
            property = context.property.name(),
            count = candidates.found.len(),
            "reference candidates"
        );
        candidates.found
    }

    /// Resolved super entities of an entity, in declaration order.
    pub fn super_entities(&self, entity: NodeHandle) -> Vec<NodeHandle> {
        let Some(node) = entity.authored_node() else {
            return Vec::new();
        };
        let Some(document) = self.document(entity.file) else {
            return Vec::new();
        };
        let Node::Entity(data) = document.ast().node(node) else {
            return Vec::new();
        };
        let context = ReferenceContext::new(entity.file, node, Property::SuperEntities);
        data.super_entities
            .iter()
            .filter_map(|reference| self.resolve(&context, &reference.text))
            .map(|description| description.handle)
            .collect()
    }

    /// Attributes of an entity including inherited ones: own attributes
    /// first, then super entities depth-first. The first attribute with a
    /// given id wins; inheritance cycles are cut.
    pub fn entity_attributes(&self, entity: NodeHandle) -> Vec<(NodeHandle, SmolStr)> {
        let mut visited = FxHashSet::default();
        let mut ids = FxHashSet::default();
        let mut attributes = Vec::new();
        self.collect_attributes(entity, &mut visited, &mut ids, &mut attributes);
        attributes
    }

    fn collect_attributes(
        &self,
        entity: NodeHandle,
        visited: &mut FxHashSet<NodeHandle>,
        ids: &mut FxHashSet<SmolStr>,
        attributes: &mut Vec<(NodeHandle, SmolStr)>,
    ) {
        if !visited.insert(entity) {
            return;
        }
        let Some(node) = entity.authored_node() else {
            return;
        };
        let Some(document) = self.document(entity.file) else {
            return;
        };
        let Node::Entity(data) = document.ast().node(node) else {
            return;
        };
        for &attribute in &data.attributes {
            let Some(id) = document.ast().node(attribute).id() else {
                continue;
            };
            if ids.insert(id.clone()) {
                attributes.push((NodeHandle::authored(entity.file, attribute), id.clone()));
            }
        }
        for parent in self.super_entities(entity) {
            self.collect_attributes(parent, visited, ids, attributes);
        }
    }
}

//! Scope computation.
//!
//! Runs in two build phases:
//!
//! ```text
//! IndexedContent   compute_exports        authored nodes → symbol index
//!                  compute_local_scopes   authored nodes → container scopes
//! ComputedScopes   compute_derived        entity attributes cloned onto
//!                                         entity nodes, source and target objects
//!                  add_derived            clones → container scopes, index
//! ```

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::ids::global_id;
use super::resolve::{ReferenceContext, ScopeProvider};
use super::symbols::{DerivedAttribute, Description, NodeHandle, Visibility};
use crate::base::FileId;
use crate::parser::{Ast, Node, NodeId, NodeKind, Property};
use crate::syntax::combine_ids;

/// Whether `node` lives inside a system diagram. Diagrams are self-contained
/// and export nothing but themselves.
pub fn is_diagram_content(ast: &Ast, node: NodeId) -> bool {
    ast.container(node)
        .and_then(|parent| ast.ancestor_where(parent, |n| matches!(n, Node::SystemDiagram(_))))
        .is_some()
}

// ============================================================================
// EXPORTS
// ============================================================================

/// Package and global descriptions of every exportable authored node.
pub fn compute_exports(
    file: FileId,
    ast: &Ast,
    local_ids: &FxHashMap<NodeId, SmolStr>,
    package_id: &str,
    package_reference: &str,
) -> Vec<Description> {
    let mut exports = Vec::new();
    for node in ast.ids() {
        let Some(local_id) = local_ids.get(&node) else {
            continue;
        };
        if is_diagram_content(ast, node) {
            continue;
        }
        let handle = NodeHandle::authored(file, node);
        let kind = ast.kind(node);
        export_twice(&mut exports, local_id, kind, handle, package_id, package_reference);
    }
    exports
}

fn export_twice(
    exports: &mut Vec<Description>,
    local_id: &str,
    kind: NodeKind,
    handle: NodeHandle,
    package_id: &str,
    package_reference: &str,
) {
    exports.push(Description::new(local_id, kind, handle, package_id, Visibility::Package));
    exports.push(Description::new(
        global_id(package_reference, local_id),
        kind,
        handle,
        package_reference,
        Visibility::Global,
    ));
}

/// Package and global descriptions of a document's derived attributes.
///
/// Clones owned by diagram nodes stay diagram-private.
pub fn derived_exports(
    file: FileId,
    ast: &Ast,
    derived: &[DerivedAttribute],
    package_id: &str,
    package_reference: &str,
) -> Vec<Description> {
    let mut exports = Vec::new();
    for (index, attribute) in derived.iter().enumerate() {
        if attribute.kind == NodeKind::EntityNodeAttribute || is_diagram_content(ast, attribute.owner) {
            continue;
        }
        let handle = NodeHandle::derived(file, index as u32);
        export_twice(
            &mut exports,
            &attribute.local_id,
            attribute.kind,
            handle,
            package_id,
            package_reference,
        );
    }
    exports
}

// ============================================================================
// LOCAL SCOPES
// ============================================================================

/// Names visible below each container of one document.
///
/// A container sees every identified descendant under its local id made
/// relative to the container's own local id: inside mapping `M`, source
/// object `M.Src` is `Src` and its derived attribute `M.Src.Id` is `Src.Id`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalScopes {
    scopes: FxHashMap<NodeId, Vec<Description>>,
}

impl LocalScopes {
    /// Descriptions registered directly on `container`.
    pub fn get(&self, container: NodeId) -> &[Description] {
        self.scopes.get(&container).map_or(&[], Vec::as_slice)
    }

    fn add(&mut self, container: NodeId, description: Description) {
        self.scopes.entry(container).or_default().push(description);
    }

    /// Drop every derived-attribute entry, keeping authored ones.
    pub fn clear_derived(&mut self) {
        for entries in self.scopes.values_mut() {
            entries.retain(|d| !d.handle.is_derived());
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `name` on `start` and every container above it.
    fn add_upwards(
        &mut self,
        ast: &Ast,
        local_ids: &FxHashMap<NodeId, SmolStr>,
        start: Option<NodeId>,
        local_id: &str,
        kind: NodeKind,
        handle: NodeHandle,
    ) {
        let mut current = start;
        while let Some(container) = current {
            let name = relative_name(local_id, local_ids.get(&container).map(SmolStr::as_str));
            self.add(
                container,
                Description::new(name, kind, handle, "", Visibility::Local),
            );
            current = ast.container(container);
        }
    }

    /// Register the derived attributes of a document.
    pub fn add_derived(
        &mut self,
        file: FileId,
        ast: &Ast,
        local_ids: &FxHashMap<NodeId, SmolStr>,
        derived: &[DerivedAttribute],
    ) {
        for (index, attribute) in derived.iter().enumerate() {
            self.add_upwards(
                ast,
                local_ids,
                Some(attribute.owner),
                &attribute.local_id,
                attribute.kind,
                NodeHandle::derived(file, index as u32),
            );
        }
    }
}

/// `local_id` relative to a container whose local id is `container_id`.
fn relative_name(local_id: &str, container_id: Option<&str>) -> SmolStr {
    container_id
        .and_then(|prefix| local_id.strip_prefix(prefix))
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(local_id)
        .into()
}

/// Container scopes of the authored nodes of one document.
pub fn compute_local_scopes(
    file: FileId,
    ast: &Ast,
    local_ids: &FxHashMap<NodeId, SmolStr>,
) -> LocalScopes {
    let mut scopes = LocalScopes::default();
    for node in ast.ids() {
        let Some(local_id) = local_ids.get(&node) else {
            continue;
        };
        scopes.add_upwards(
            ast,
            local_ids,
            ast.container(node),
            local_id,
            ast.kind(node),
            NodeHandle::authored(file, node),
        );
    }
    scopes
}

// ============================================================================
// DERIVED ATTRIBUTES
// ============================================================================

/// The derived kind produced by a node referencing an entity.
pub fn derived_kind(owner: NodeKind) -> Option<NodeKind> {
    match owner {
        NodeKind::EntityNode => Some(NodeKind::EntityNodeAttribute),
        NodeKind::SourceObject => Some(NodeKind::SourceObjectAttribute),
        NodeKind::TargetObject => Some(NodeKind::TargetObjectAttribute),
        _ => None,
    }
}

/// Clone the attributes of every referenced entity onto its referencing
/// entity node, source object or target object.
///
/// Clones of a target object are named by the bare attribute id; all other
/// clones by `ownerLocalId.attributeId`. Owners without a local id get no
/// clones.
pub fn compute_derived(
    provider: &ScopeProvider<'_>,
    file: FileId,
    ast: &Ast,
    local_ids: &FxHashMap<NodeId, SmolStr>,
) -> Vec<DerivedAttribute> {
    let mut derived = Vec::new();
    for node in ast.ids() {
        let kind = ast.kind(node);
        let Some(attribute_kind) = derived_kind(kind) else {
            continue;
        };
        let entity_ref = match ast.node(node) {
            Node::EntityNode(n) => n.entity.as_ref(),
            Node::SourceObject(n) => n.entity.as_ref(),
            Node::TargetObject(n) => n.entity.as_ref(),
            _ => None,
        };
        let Some(entity_ref) = entity_ref else {
            continue;
        };
        let owner_id = match kind {
            NodeKind::TargetObject => None,
            _ => match local_ids.get(&node) {
                Some(id) => Some(id.clone()),
                None => continue,
            },
        };
        let context = ReferenceContext::new(file, node, Property::Entity);
        let Some(entity) = provider.resolve(&context, &entity_ref.text) else {
            continue;
        };

        for (source, id) in provider.entity_attributes(entity.handle) {
            let local_id = match &owner_id {
                Some(owner) => SmolStr::from(combine_ids(owner, &id)),
                None => id.clone(),
            };
            derived.push(DerivedAttribute {
                kind: attribute_kind,
                owner: node,
                id,
                local_id,
                source,
            });
        }
    }
    tracing::trace!(file = %file, count = derived.len(), "derived attributes");
    derived
}

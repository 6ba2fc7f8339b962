//! Linking: resolution results of every reference of a document.
//!
//! Links are recomputed wholesale on every build; the AST itself only ever
//! holds reference text.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::resolve::{ReferenceContext, ScopeProvider};
use super::symbols::NodeHandle;
use crate::base::FileId;
use crate::parser::{Ast, NodeId, NodeKind, Property};

/// Address of one reference: the node holding it, the property and the
/// position inside a list-valued property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefSite {
    pub node: NodeId,
    pub property: Property,
    pub index: usize,
}

impl RefSite {
    pub fn new(node: NodeId, property: Property, index: usize) -> Self {
        Self {
            node,
            property,
            index,
        }
    }
}

/// Outcome of resolving one reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Linked {
    Unresolved {
        text: SmolStr,
    },
    Resolved {
        text: SmolStr,
        target: NodeHandle,
        kind: NodeKind,
    },
}

impl Linked {
    pub fn text(&self) -> &str {
        match self {
            Linked::Unresolved { text } | Linked::Resolved { text, .. } => text,
        }
    }

    pub fn target(&self) -> Option<NodeHandle> {
        match self {
            Linked::Resolved { target, .. } => Some(*target),
            Linked::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Linked::Resolved { .. })
    }
}

/// Links of one document in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkTable {
    links: IndexMap<RefSite, Linked>,
}

impl LinkTable {
    pub fn get(&self, site: RefSite) -> Option<&Linked> {
        self.links.get(&site)
    }

    /// Target of the reference at `node`/`property`/`index`, if resolved.
    pub fn target(&self, node: NodeId, property: Property, index: usize) -> Option<NodeHandle> {
        self.get(RefSite::new(node, property, index))
            .and_then(Linked::target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RefSite, &Linked)> {
        self.links.iter()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = (&RefSite, &Linked)> {
        self.links.iter().filter(|(_, link)| !link.is_resolved())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Resolve every reference of a document.
pub fn link_document(provider: &ScopeProvider<'_>, file: FileId, ast: &Ast) -> LinkTable {
    let mut links = IndexMap::new();
    for node in ast.ids() {
        for (property, index, reference) in ast.node(node).references() {
            let context = ReferenceContext::new(file, node, property);
            let linked = match provider.resolve(&context, &reference.text) {
                Some(description) => Linked::Resolved {
                    text: reference.text.clone(),
                    target: description.handle,
                    kind: description.kind,
                },
                None => Linked::Unresolved {
                    text: reference.text.clone(),
                },
            };
            links.insert(RefSite::new(node, property, index), linked);
        }
    }
    let table = LinkTable { links };
    tracing::trace!(
        file = %file,
        links = table.len(),
        unresolved = table.unresolved().count(),
        "linked document"
    );
    table
}

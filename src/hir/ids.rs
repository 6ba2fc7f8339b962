//! Qualified identifiers.
//!
//! - `node_id`: the raw `id` of a node
//! - `local_id`: the node id prefixed with the local id of its nearest
//!   identified owner, e.g. `Customer.Id`
//! - `global_id`: the local id prefixed with the package reference name
//!
//! Id proposals (`find_next_id`) return the proposal unchanged when it is
//! free and otherwise append the smallest free positive suffix.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::parser::{Ast, NodeId, NodeKind};
use crate::syntax::combine_ids;

/// The authored `id` of a node.
pub fn node_id(ast: &Ast, node: NodeId) -> Option<SmolStr> {
    ast.node(node).id().cloned()
}

/// Nearest container that carries an `id` property, whether set or not.
pub fn identified_owner(ast: &Ast, node: NodeId) -> Option<NodeId> {
    let parent = ast.container(node)?;
    ast.ancestor_where(parent, |n| n.is_identified())
}

/// Document-local qualified id of `node`.
///
/// `None` when the node has no id. An owner without an id contributes
/// nothing to the prefix.
pub fn local_id(ast: &Ast, node: NodeId) -> Option<SmolStr> {
    let own = node_id(ast, node)?;
    match identified_owner(ast, node).and_then(|owner| local_id(ast, owner)) {
        Some(prefix) => Some(combine_ids(&prefix, &own).into()),
        None => Some(own),
    }
}

/// Package-qualified id.
pub fn global_id(package_reference: &str, local_id: &str) -> SmolStr {
    combine_ids(package_reference, local_id).into()
}

/// Local ids of every identified node of a document, computed in one walk.
pub fn compute_local_ids(ast: &Ast) -> FxHashMap<NodeId, SmolStr> {
    fn walk(ast: &Ast, node: NodeId, stack: &mut IdStack, out: &mut FxHashMap<NodeId, SmolStr>) {
        let identified = ast.node(node).is_identified();
        if identified {
            let qualified = stack.enter(node_id(ast, node));
            if let Some(qualified) = qualified {
                out.insert(node, qualified);
            }
        }
        for child in ast.children(node) {
            walk(ast, child, stack, out);
        }
        if identified {
            stack.pop();
        }
    }

    let mut out = FxHashMap::default();
    let mut stack = IdStack::default();
    walk(ast, ast.root(), &mut stack, &mut out);
    out
}

/// Stack of qualified ids of the identified nodes enclosing a traversal.
#[derive(Debug, Default, Clone)]
pub struct IdStack {
    frames: Vec<Option<SmolStr>>,
}

impl IdStack {
    /// Push the qualified id of a node with raw id `id` and return it.
    pub fn enter(&mut self, id: Option<SmolStr>) -> Option<SmolStr> {
        let qualified = id.map(|id| match self.current() {
            Some(prefix) => SmolStr::from(combine_ids(prefix, &id)),
            None => id,
        });
        self.frames.push(qualified.clone());
        qualified
    }

    /// Qualified id of the innermost frame.
    pub fn current(&self) -> Option<&SmolStr> {
        self.frames.last().and_then(Option::as_ref)
    }

    /// Leave the innermost frame.
    ///
    /// # Panics
    ///
    /// Panics when the stack is empty; enter/pop calls must be balanced.
    pub fn pop(&mut self) -> Option<SmolStr> {
        match self.frames.pop() {
            Some(frame) => frame,
            None => panic!("IdStack::pop called on an empty stack"),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// `proposal`, or `proposal` with the smallest free positive suffix.
pub fn next_free_id(proposal: &str, is_taken: impl Fn(&str) -> bool) -> SmolStr {
    if !is_taken(proposal) {
        return proposal.into();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{proposal}{counter}");
        if !is_taken(&candidate) {
            return candidate.into();
        }
        counter += 1;
    }
}

/// Unique id for a new node of `kind` below `container`.
///
/// Only nodes of the same kind inside the container's subtree are considered.
pub fn find_next_id(ast: &Ast, container: NodeId, kind: NodeKind, proposal: &str) -> SmolStr {
    let taken: Vec<SmolStr> = ast
        .descendants(container)
        .into_iter()
        .filter(|&node| ast.kind(node) == kind)
        .filter_map(|node| node_id(ast, node))
        .collect();
    next_free_id(proposal, |candidate| taken.iter().any(|id| id == candidate))
}

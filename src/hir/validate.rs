//! Semantic checks over a linked document.
//!
//! Every rule violation is a [`Diagnostic`]; validation never fails.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::build::{Document, ValidationOptions};
use super::diagnostics::{Diagnostic, DiagnosticCollector, codes};
use super::ids::{global_id, node_id};
use super::link::{Linked, RefSite};
use super::resolve::ScopeProvider;
use super::symbols::{NodeHandle, Visibility};
use crate::base::{TextRange, TextSize};
use crate::parser::{
    Ast, AttributeMapping, JoinKind, Node, NodeId, NodeKind, Property, Relationship, SourceObject,
    TargetObject, expected_reference_kind,
};

/// `{{ source }}` tokens of an attribute-mapping expression.
static EXPRESSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").unwrap());

/// Run every check on `document`, syntax errors included.
pub fn validate_document(
    provider: &ScopeProvider<'_>,
    document: &Document,
    options: ValidationOptions,
) -> Vec<Diagnostic> {
    let mut validator = Validator {
        provider,
        document,
        ast: document.ast(),
        out: DiagnosticCollector::new(document.file),
    };
    for error in document.syntax.errors() {
        validator
            .out
            .add(Diagnostic::from_syntax_error(document.file, error));
    }

    validator.check_unresolved();
    let ast = validator.ast;
    for node in ast.ids() {
        match ast.node(node) {
            Node::Entity(_) => {
                validator.check_global_id(node);
                validator.check_inheritance_cycle(node);
            }
            Node::EntityAttribute(_) => validator.check_global_id(node),
            Node::Relationship(relationship) => {
                validator.check_global_id(node);
                validator.check_relationship_attributes(node, relationship);
            }
            Node::Mapping(mapping) => {
                validator.check_global_id(node);
                validator.check_sibling_ids(mapping.sources.iter());
                validator.check_sources(&mapping.sources);
            }
            Node::SourceObject(source) => validator.check_dependencies(node, source),
            Node::TargetObject(target) => validator.check_target_mappings(target),
            Node::AttributeMapping(mapping) => validator.check_expression(mapping),
            Node::SystemDiagram(diagram) => {
                validator.check_global_id(node);
                let elements = diagram
                    .nodes
                    .iter()
                    .chain(&diagram.edges)
                    .chain(&diagram.inheritance_edges);
                validator.check_sibling_ids(elements);
            }
            _ => {}
        }
    }
    if options.filename_convention {
        validator.check_filename();
    }

    let diagnostics = validator.out.finish();
    tracing::trace!(
        file = %document.file,
        count = diagnostics.len(),
        "validated document"
    );
    diagnostics
}

struct Validator<'a, 'p> {
    provider: &'a ScopeProvider<'p>,
    document: &'a Document,
    ast: &'a Ast,
    out: DiagnosticCollector,
}

impl Validator<'_, '_> {
    fn id_range(&self, node: NodeId) -> TextRange {
        self.ast.property_range(node, Property::Id)
    }

    fn target(&self, node: NodeId, property: Property) -> Option<NodeHandle> {
        self.document.links.target(node, property, 0)
    }

    // ------------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------------

    fn check_unresolved(&mut self) {
        for node in self.ast.ids() {
            for (property, index, reference) in self.ast.node(node).references() {
                let site = RefSite::new(node, property, index);
                let Some(Linked::Unresolved { text }) = self.document.links.get(site) else {
                    continue;
                };
                let type_name = expected_reference_kind(self.ast.kind(node), property)
                    .map_or("element", NodeKind::type_name);
                let message =
                    format!("Could not resolve reference to {type_name} named '{text}'.");
                self.out.error(
                    reference.range,
                    codes::UNRESOLVED_REFERENCE,
                    Some(property),
                    message,
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Ids
    // ------------------------------------------------------------------------

    fn check_global_id(&mut self, node: NodeId) {
        let kind = self.ast.kind(node);
        let Some(local_id) = self.document.local_id(node) else {
            self.out.error(
                self.id_range(node),
                codes::MISSING_ID,
                Some(Property::Id),
                format!("Missing id for {}.", kind.label()),
            );
            return;
        };
        let global = global_id(&self.document.package_reference, local_id);
        let count = self
            .provider
            .index()
            .lookup(&global)
            .iter()
            .filter(|d| d.visibility == Visibility::Global && d.kind == kind)
            .count();
        if count > 1 {
            self.out.error(
                self.id_range(node),
                codes::DUPLICATE_ID,
                Some(Property::Id),
                format!("Must provide a unique id for {}: '{global}' is used {count} times.", kind.label()),
            );
        }
    }

    /// Flag every sibling whose id was already taken by an earlier one.
    fn check_sibling_ids<'n>(&mut self, siblings: impl Iterator<Item = &'n NodeId>) {
        let mut seen = FxHashSet::default();
        for &sibling in siblings {
            let Some(id) = node_id(self.ast, sibling) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                self.out.error(
                    self.id_range(sibling),
                    codes::DUPLICATE_LOCAL_ID,
                    Some(Property::Id),
                    format!("Duplicate id '{id}'."),
                );
            }
        }
    }

    fn check_filename(&mut self) {
        let Some(root) = self.ast.root_content() else {
            return;
        };
        let Some(id) = node_id(self.ast, root) else {
            return;
        };
        let Some(base) = self.document.base_name() else {
            return;
        };
        if !base.eq_ignore_ascii_case(&id) {
            self.out.warning(
                self.id_range(root),
                codes::FILENAME_MISMATCH,
                Some(Property::Id),
                format!("Filename '{base}' should match the id '{id}'."),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    fn check_inheritance_cycle(&mut self, entity: NodeId) {
        let start = NodeHandle::authored(self.document.file, entity);
        let Some(cycle) = find_inheritance_cycle(self.provider, start) else {
            return;
        };
        let names: Vec<SmolStr> = cycle
            .iter()
            .map(|handle| entity_name(self.provider, *handle))
            .collect();
        self.out.error(
            self.ast.property_range(entity, Property::SuperEntities),
            codes::INHERITANCE_CYCLE,
            Some(Property::SuperEntities),
            format!("Inheritance cycle detected: {}.", names.join(" -> ")),
        );
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    fn check_relationship_attributes(&mut self, node: NodeId, relationship: &Relationship) {
        let parent = self.target(node, Property::Parent);
        let child = self.target(node, Property::Child);
        let mut used_parent = FxHashSet::default();
        let mut used_child = FxHashSet::default();
        for &attribute in &relationship.attributes {
            self.check_relationship_side(attribute, Property::Parent, parent, &mut used_parent);
            self.check_relationship_side(attribute, Property::Child, child, &mut used_child);
        }
    }

    fn check_relationship_side(
        &mut self,
        attribute: NodeId,
        side: Property,
        entity: Option<NodeHandle>,
        used: &mut FxHashSet<NodeHandle>,
    ) {
        let (Some(entity), Some(target)) = (entity, self.target(attribute, side)) else {
            return;
        };
        let range = self.ast.property_range(attribute, side);
        let label = side.name();
        if !self.is_attribute_of(target, entity) {
            self.out.error(
                range,
                codes::FOREIGN_RELATIONSHIP_ATTRIBUTE,
                Some(side),
                format!("The {label} attribute must be an attribute of the {label} entity."),
            );
        } else if !used.insert(target) {
            self.out.error(
                range,
                codes::RELATIONSHIP_ATTRIBUTE_REUSED,
                Some(side),
                format!("Each {label} attribute can only be referenced once."),
            );
        }
    }

    /// Whether `attribute` is literally declared by `entity`.
    fn is_attribute_of(&self, attribute: NodeHandle, entity: NodeHandle) -> bool {
        if attribute.file != entity.file {
            return false;
        }
        let owner_file = entity.file;
        let (Some(attribute), Some(entity)) = (attribute.authored_node(), entity.authored_node())
        else {
            return false;
        };
        self.provider
            .document(owner_file)
            .is_some_and(|owner| {
                owner.ast().kind(attribute) == NodeKind::EntityAttribute
                    && owner.ast().container(attribute) == Some(entity)
            })
    }

    // ------------------------------------------------------------------------
    // Mappings
    // ------------------------------------------------------------------------

    fn check_sources(&mut self, sources: &[NodeId]) {
        let mut has_from = false;
        for &source in sources {
            let Node::SourceObject(data) = self.ast.node(source) else {
                continue;
            };
            if data.join != Some(JoinKind::From) {
                continue;
            }
            if has_from {
                self.out.error(
                    self.ast.property_range(source, Property::Join),
                    codes::MULTIPLE_FROM_SOURCES,
                    Some(Property::Join),
                    "Only one source object may use the 'from' join.",
                );
            }
            has_from = true;
        }
    }

    fn check_dependencies(&mut self, source: NodeId, data: &SourceObject) {
        if data.join == Some(JoinKind::From) && !data.dependencies.is_empty() {
            self.out.error(
                self.ast.property_range(source, Property::Dependencies),
                codes::FROM_WITH_DEPENDENCIES,
                Some(Property::Dependencies),
                "A source object with the 'from' join cannot have dependencies.",
            );
        }

        let mut seen: FxHashSet<Result<NodeHandle, SmolStr>> = FxHashSet::default();
        for &dependency in &data.dependencies {
            let Some(link) = self
                .document
                .links
                .get(RefSite::new(dependency, Property::Value, 0))
            else {
                continue;
            };
            let range = self.ast.range(dependency);
            if let Some(target) = link.target() {
                if target.file != self.document.file {
                    self.out.error(
                        range,
                        codes::INVALID_DEPENDENCY,
                        Some(Property::Value),
                        "A dependency must reference a source object of the same mapping.",
                    );
                } else if target.authored_node() == Some(source) {
                    self.out.error(
                        range,
                        codes::INVALID_DEPENDENCY,
                        Some(Property::Value),
                        "A source object cannot depend on itself.",
                    );
                }
            }
            let key = link.target().ok_or_else(|| SmolStr::from(link.text()));
            if !seen.insert(key) {
                self.out.warning(
                    range,
                    codes::DUPLICATE_DEPENDENCY,
                    Some(Property::Value),
                    format!("Duplicate dependency on '{}'.", link.text()),
                );
            }
        }
    }

    fn check_target_mappings(&mut self, target: &TargetObject) {
        let mut mapped = FxHashSet::default();
        for &mapping in &target.mappings {
            let Node::AttributeMapping(data) = self.ast.node(mapping) else {
                continue;
            };
            let Some(attribute) = data.attribute else {
                continue;
            };
            let Some(handle) = self.target(attribute, Property::Value) else {
                continue;
            };
            if !mapped.insert(handle) {
                let text = self
                    .document
                    .links
                    .get(RefSite::new(attribute, Property::Value, 0))
                    .map_or("", Linked::text);
                self.out.error(
                    self.ast.range(attribute),
                    codes::TARGET_ATTRIBUTE_REMAPPED,
                    Some(Property::Attribute),
                    format!("Target attribute '{text}' is already mapped."),
                );
            }
        }
    }

    fn check_expression(&mut self, mapping: &AttributeMapping) {
        let Some(range) = mapping.expression_range else {
            return;
        };
        let Some(raw) = self.document.text.get(Range::<usize>::from(range)) else {
            return;
        };
        let declared: FxHashSet<&str> = mapping
            .sources
            .iter()
            .filter_map(|&source| match self.ast.node(source) {
                Node::AttributeMappingSource(s) => Some(s.value.text.as_str()),
                _ => None,
            })
            .collect();

        for token in EXPRESSION_TOKEN.captures_iter(raw) {
            let (Some(whole), Some(inner)) = (token.get(0), token.get(1)) else {
                continue;
            };
            let name: String = inner.as_str().trim().chars().filter(|&c| c != '^').collect();
            if declared.contains(name.as_str()) {
                continue;
            }
            let start = range.start() + TextSize::from(whole.start() as u32);
            let token_range = TextRange::at(start, TextSize::from(whole.len() as u32));
            self.out.error(
                token_range,
                codes::UNDECLARED_EXPRESSION_SOURCE,
                Some(Property::Expression),
                format!("'{name}' is not a source of this attribute mapping."),
            );
        }
    }
}

/// Linked super entities of an entity, in declaration order.
fn linked_super_entities(provider: &ScopeProvider<'_>, entity: NodeHandle) -> Vec<NodeHandle> {
    let Some(node) = entity.authored_node() else {
        return Vec::new();
    };
    let Some(document) = provider.document(entity.file) else {
        return Vec::new();
    };
    let Node::Entity(data) = document.ast().node(node) else {
        return Vec::new();
    };
    (0..data.super_entities.len())
        .filter_map(|index| document.links.target(node, Property::SuperEntities, index))
        .collect()
}

fn entity_name(provider: &ScopeProvider<'_>, entity: NodeHandle) -> SmolStr {
    entity
        .authored_node()
        .zip(provider.document(entity.file))
        .and_then(|(node, document)| node_id(document.ast(), node))
        .unwrap_or_default()
}

/// Depth-first search for an inheritance cycle reachable from `start`.
///
/// Returns the cycle as the path from the first occurrence of the repeated
/// entity, with that entity appended again: `[A, B, C, A]`. Unresolved super
/// entities are skipped.
pub fn find_inheritance_cycle(provider: &ScopeProvider<'_>, start: NodeHandle) -> Option<Vec<NodeHandle>> {
    let mut path = Vec::new();
    let mut on_stack = FxHashSet::default();
    let mut done = FxHashSet::default();
    visit(provider, start, &mut path, &mut on_stack, &mut done)
}

fn visit(
    provider: &ScopeProvider<'_>,
    entity: NodeHandle,
    path: &mut Vec<NodeHandle>,
    on_stack: &mut FxHashSet<NodeHandle>,
    done: &mut FxHashSet<NodeHandle>,
) -> Option<Vec<NodeHandle>> {
    if on_stack.contains(&entity) {
        let first = path.iter().position(|&h| h == entity)?;
        let mut cycle = path[first..].to_vec();
        cycle.push(entity);
        return Some(cycle);
    }
    if !done.insert(entity) {
        return None;
    }
    path.push(entity);
    on_stack.insert(entity);
    for parent in linked_super_entities(provider, entity) {
        if let Some(cycle) = visit(provider, parent, path, on_stack, done) {
            return Some(cycle);
        }
    }
    on_stack.remove(&entity);
    path.pop();
    None
}

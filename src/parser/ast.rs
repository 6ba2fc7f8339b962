//! Typed AST arena for CrossModel documents.
//!
//! Every node of one document lives in a single [`Ast`]; nodes refer to their
//! children and to their container by [`NodeId`]. The container link is a
//! plain index and owns nothing, the arena is dropped as a whole.
//!
//! Cross-references are stored as [`Reference`]s holding only their text.
//! Resolution results live outside the tree (see `hir::link`).

use smol_str::SmolStr;

use crate::base::TextRange;

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A textual cross-reference, e.g. `Customer` or `CustomerSource.Id`.
///
/// The stored text has keyword escapes (`^`) removed from every segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub text: SmolStr,
    pub range: TextRange,
}

impl Reference {
    pub fn new(text: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

// ============================================================================
// VALUE ENUMS
// ============================================================================

/// Cardinality of one side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ZeroOne,
    One,
    Multiple,
}

impl Cardinality {
    pub fn keyword(self) -> &'static str {
        match self {
            Cardinality::ZeroOne => "zero-one",
            Cardinality::One => "one",
            Cardinality::Multiple => "multiple",
        }
    }
}

/// Role of a source object within a mapping's join chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    From,
    InnerJoin,
    CrossJoin,
    LeftJoin,
    Apply,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::From => "from",
            JoinKind::InnerJoin => "inner-join",
            JoinKind::CrossJoin => "cross-join",
            JoinKind::LeftJoin => "left-join",
            JoinKind::Apply => "apply",
        }
    }
}

/// Comparison operator of a join condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
        }
    }
}

/// Right-hand side of a join condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Reference(Reference),
    Number(f64),
    String(String),
}

// ============================================================================
// PROPERTIES
// ============================================================================

/// A property slot of a node. Used to address values, ranges and references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Id,
    Name,
    Description,
    SuperEntities,
    Attributes,
    Datatype,
    Length,
    Precision,
    Scale,
    Identifier,
    Parent,
    ParentRole,
    ParentCardinality,
    Child,
    ChildRole,
    ChildCardinality,
    Sources,
    Target,
    Join,
    Dependencies,
    Conditions,
    Mappings,
    Attribute,
    Expression,
    Entity,
    Relationship,
    Nodes,
    Edges,
    InheritanceEdges,
    X,
    Y,
    Width,
    Height,
    SourceNode,
    TargetNode,
    BaseNode,
    SuperNode,
    /// Inline value of a dependency or attribute-mapping source/target.
    Value,
    /// Left operand of a join condition.
    Left,
    /// Operator of a join condition.
    Op,
    /// Right operand of a join condition.
    Right,
}

impl Property {
    /// The model-facing property name.
    pub fn name(self) -> &'static str {
        match self {
            Property::Id => "id",
            Property::Name => "name",
            Property::Description => "description",
            Property::SuperEntities => "superEntities",
            Property::Attributes => "attributes",
            Property::Datatype => "datatype",
            Property::Length => "length",
            Property::Precision => "precision",
            Property::Scale => "scale",
            Property::Identifier => "identifier",
            Property::Parent => "parent",
            Property::ParentRole => "parentRole",
            Property::ParentCardinality => "parentCardinality",
            Property::Child => "child",
            Property::ChildRole => "childRole",
            Property::ChildCardinality => "childCardinality",
            Property::Sources => "sources",
            Property::Target => "target",
            Property::Join => "join",
            Property::Dependencies => "dependencies",
            Property::Conditions => "conditions",
            Property::Mappings => "mappings",
            Property::Attribute => "attribute",
            Property::Expression => "expression",
            Property::Entity => "entity",
            Property::Relationship => "relationship",
            Property::Nodes => "nodes",
            Property::Edges => "edges",
            Property::InheritanceEdges => "inheritanceEdges",
            Property::X => "x",
            Property::Y => "y",
            Property::Width => "width",
            Property::Height => "height",
            Property::SourceNode => "sourceNode",
            Property::TargetNode => "targetNode",
            Property::BaseNode => "baseNode",
            Property::SuperNode => "superNode",
            Property::Value => "value",
            Property::Left => "left",
            Property::Op => "op",
            Property::Right => "right",
        }
    }

    /// The key written in `.cm` text, if the property is written as `key:`.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Property::SuperEntities => Some("inherits"),
            Property::Value | Property::Left | Property::Op | Property::Right => None,
            other => Some(other.name()),
        }
    }
}

// ============================================================================
// NODE KINDS
// ============================================================================

/// The type of a node, authored or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ModelRoot,
    Entity,
    EntityAttribute,
    Relationship,
    RelationshipAttribute,
    Mapping,
    SourceObject,
    SourceObjectDependency,
    JoinCondition,
    TargetObject,
    AttributeMapping,
    AttributeMappingSource,
    AttributeMappingTarget,
    SystemDiagram,
    EntityNode,
    RelationshipEdge,
    InheritanceEdge,
    // Derived views of entity attributes
    EntityNodeAttribute,
    SourceObjectAttribute,
    TargetObjectAttribute,
}

impl NodeKind {
    /// The `$type` name of the kind.
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::ModelRoot => "CrossModelRoot",
            NodeKind::Entity => "LogicalEntity",
            NodeKind::EntityAttribute => "LogicalAttribute",
            NodeKind::Relationship => "Relationship",
            NodeKind::RelationshipAttribute => "RelationshipAttribute",
            NodeKind::Mapping => "Mapping",
            NodeKind::SourceObject => "SourceObject",
            NodeKind::SourceObjectDependency => "SourceObjectDependency",
            NodeKind::JoinCondition => "JoinCondition",
            NodeKind::TargetObject => "TargetObject",
            NodeKind::AttributeMapping => "AttributeMapping",
            NodeKind::AttributeMappingSource => "AttributeMappingSource",
            NodeKind::AttributeMappingTarget => "AttributeMappingTarget",
            NodeKind::SystemDiagram => "SystemDiagram",
            NodeKind::EntityNode => "LogicalEntityNode",
            NodeKind::RelationshipEdge => "RelationshipEdge",
            NodeKind::InheritanceEdge => "InheritanceEdge",
            NodeKind::EntityNodeAttribute => "LogicalEntityNodeAttribute",
            NodeKind::SourceObjectAttribute => "SourceObjectAttribute",
            NodeKind::TargetObjectAttribute => "TargetObjectAttribute",
        }
    }

    /// Lower-case label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::ModelRoot => "document",
            NodeKind::Entity => "entity",
            NodeKind::EntityAttribute => "attribute",
            NodeKind::Relationship => "relationship",
            NodeKind::RelationshipAttribute => "relationship attribute",
            NodeKind::Mapping => "mapping",
            NodeKind::SourceObject => "source object",
            NodeKind::SourceObjectDependency => "dependency",
            NodeKind::JoinCondition => "join condition",
            NodeKind::TargetObject => "target object",
            NodeKind::AttributeMapping => "attribute mapping",
            NodeKind::AttributeMappingSource => "mapping source",
            NodeKind::AttributeMappingTarget => "mapping target",
            NodeKind::SystemDiagram => "system diagram",
            NodeKind::EntityNode => "entity node",
            NodeKind::RelationshipEdge => "relationship edge",
            NodeKind::InheritanceEdge => "inheritance edge",
            NodeKind::EntityNodeAttribute => "entity node attribute",
            NodeKind::SourceObjectAttribute => "source object attribute",
            NodeKind::TargetObjectAttribute => "target object attribute",
        }
    }

    /// Derived attribute kinds are computed, never parsed.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            NodeKind::EntityNodeAttribute
                | NodeKind::SourceObjectAttribute
                | NodeKind::TargetObjectAttribute
        )
    }

    /// Kinds that behave like an entity attribute.
    pub fn is_attribute(self) -> bool {
        self == NodeKind::EntityAttribute || self.is_derived()
    }
}

// ============================================================================
// NODES
// ============================================================================

/// Document root. Holds at most one semantic root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRoot {
    pub content: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub id: Option<SmolStr>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub super_entities: Vec<Reference>,
    pub attributes: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityAttribute {
    pub id: Option<SmolStr>,
    pub name: Option<String>,
    pub datatype: Option<String>,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub identifier: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    pub id: Option<SmolStr>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<Reference>,
    pub parent_role: Option<String>,
    pub parent_cardinality: Option<Cardinality>,
    pub child: Option<Reference>,
    pub child_role: Option<String>,
    pub child_cardinality: Option<Cardinality>,
    pub attributes: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipAttribute {
    pub parent: Option<Reference>,
    pub child: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    pub id: Option<SmolStr>,
    pub sources: Vec<NodeId>,
    pub target: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceObject {
    pub id: Option<SmolStr>,
    pub entity: Option<Reference>,
    pub join: Option<JoinKind>,
    pub dependencies: Vec<NodeId>,
    pub conditions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceObjectDependency {
    pub source: Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub left: Reference,
    pub op: Operator,
    pub right: Operand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetObject {
    pub entity: Option<Reference>,
    pub mappings: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMapping {
    pub attribute: Option<NodeId>,
    pub sources: Vec<NodeId>,
    pub expression: Option<String>,
    /// Range of the expression string literal, quotes included.
    pub expression_range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMappingSource {
    pub value: Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMappingTarget {
    pub value: Reference,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemDiagram {
    pub id: Option<SmolStr>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<NodeId>,
    pub inheritance_edges: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityNode {
    pub id: Option<SmolStr>,
    pub entity: Option<Reference>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipEdge {
    pub id: Option<SmolStr>,
    pub relationship: Option<Reference>,
    pub source_node: Option<Reference>,
    pub target_node: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritanceEdge {
    pub id: Option<SmolStr>,
    pub base_node: Option<Reference>,
    pub super_node: Option<Reference>,
}

/// One node of the tree, one variant per grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    ModelRoot(ModelRoot),
    Entity(Entity),
    EntityAttribute(EntityAttribute),
    Relationship(Relationship),
    RelationshipAttribute(RelationshipAttribute),
    Mapping(Mapping),
    SourceObject(SourceObject),
    SourceObjectDependency(SourceObjectDependency),
    JoinCondition(JoinCondition),
    TargetObject(TargetObject),
    AttributeMapping(AttributeMapping),
    AttributeMappingSource(AttributeMappingSource),
    AttributeMappingTarget(AttributeMappingTarget),
    SystemDiagram(SystemDiagram),
    EntityNode(EntityNode),
    RelationshipEdge(RelationshipEdge),
    InheritanceEdge(InheritanceEdge),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::ModelRoot(_) => NodeKind::ModelRoot,
            Node::Entity(_) => NodeKind::Entity,
            Node::EntityAttribute(_) => NodeKind::EntityAttribute,
            Node::Relationship(_) => NodeKind::Relationship,
            Node::RelationshipAttribute(_) => NodeKind::RelationshipAttribute,
            Node::Mapping(_) => NodeKind::Mapping,
            Node::SourceObject(_) => NodeKind::SourceObject,
            Node::SourceObjectDependency(_) => NodeKind::SourceObjectDependency,
            Node::JoinCondition(_) => NodeKind::JoinCondition,
            Node::TargetObject(_) => NodeKind::TargetObject,
            Node::AttributeMapping(_) => NodeKind::AttributeMapping,
            Node::AttributeMappingSource(_) => NodeKind::AttributeMappingSource,
            Node::AttributeMappingTarget(_) => NodeKind::AttributeMappingTarget,
            Node::SystemDiagram(_) => NodeKind::SystemDiagram,
            Node::EntityNode(_) => NodeKind::EntityNode,
            Node::RelationshipEdge(_) => NodeKind::RelationshipEdge,
            Node::InheritanceEdge(_) => NodeKind::InheritanceEdge,
        }
    }

    /// The authored `id` of identified nodes.
    pub fn id(&self) -> Option<&SmolStr> {
        match self {
            Node::Entity(n) => n.id.as_ref(),
            Node::EntityAttribute(n) => n.id.as_ref(),
            Node::Relationship(n) => n.id.as_ref(),
            Node::Mapping(n) => n.id.as_ref(),
            Node::SourceObject(n) => n.id.as_ref(),
            Node::SystemDiagram(n) => n.id.as_ref(),
            Node::EntityNode(n) => n.id.as_ref(),
            Node::RelationshipEdge(n) => n.id.as_ref(),
            Node::InheritanceEdge(n) => n.id.as_ref(),
            _ => None,
        }
    }

    /// Whether the node kind carries an `id` property at all.
    pub fn is_identified(&self) -> bool {
        matches!(
            self,
            Node::Entity(_)
                | Node::EntityAttribute(_)
                | Node::Relationship(_)
                | Node::Mapping(_)
                | Node::SourceObject(_)
                | Node::SystemDiagram(_)
                | Node::EntityNode(_)
                | Node::RelationshipEdge(_)
                | Node::InheritanceEdge(_)
        )
    }

    /// Structural children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::ModelRoot(n) => n.content.into_iter().collect(),
            Node::Entity(n) => n.attributes.clone(),
            Node::Relationship(n) => n.attributes.clone(),
            Node::Mapping(n) => n.sources.iter().copied().chain(n.target).collect(),
            Node::SourceObject(n) => n
                .dependencies
                .iter()
                .chain(&n.conditions)
                .copied()
                .collect(),
            Node::TargetObject(n) => n.mappings.clone(),
            Node::AttributeMapping(n) => n.attribute.into_iter().chain(n.sources.iter().copied()).collect(),
            Node::SystemDiagram(n) => n
                .nodes
                .iter()
                .chain(&n.edges)
                .chain(&n.inheritance_edges)
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Cross-references held directly by this node, with their slot.
    pub fn references(&self) -> Vec<(Property, usize, &Reference)> {
        fn opt<'a>(out: &mut Vec<(Property, usize, &'a Reference)>, property: Property, r: &'a Option<Reference>) {
            if let Some(r) = r {
                out.push((property, 0, r));
            }
        }

        let mut out = Vec::new();
        match self {
            Node::Entity(n) => {
                for (index, r) in n.super_entities.iter().enumerate() {
                    out.push((Property::SuperEntities, index, r));
                }
            }
            Node::Relationship(n) => {
                opt(&mut out, Property::Parent, &n.parent);
                opt(&mut out, Property::Child, &n.child);
            }
            Node::RelationshipAttribute(n) => {
                opt(&mut out, Property::Parent, &n.parent);
                opt(&mut out, Property::Child, &n.child);
            }
            Node::SourceObject(n) => opt(&mut out, Property::Entity, &n.entity),
            Node::SourceObjectDependency(n) => out.push((Property::Value, 0, &n.source)),
            Node::JoinCondition(n) => {
                out.push((Property::Left, 0, &n.left));
                if let Operand::Reference(r) = &n.right {
                    out.push((Property::Right, 0, r));
                }
            }
            Node::TargetObject(n) => opt(&mut out, Property::Entity, &n.entity),
            Node::AttributeMappingSource(n) => out.push((Property::Value, 0, &n.value)),
            Node::AttributeMappingTarget(n) => out.push((Property::Value, 0, &n.value)),
            Node::EntityNode(n) => opt(&mut out, Property::Entity, &n.entity),
            Node::RelationshipEdge(n) => {
                opt(&mut out, Property::Relationship, &n.relationship);
                opt(&mut out, Property::SourceNode, &n.source_node);
                opt(&mut out, Property::TargetNode, &n.target_node);
            }
            Node::InheritanceEdge(n) => {
                opt(&mut out, Property::BaseNode, &n.base_node);
                opt(&mut out, Property::SuperNode, &n.super_node);
            }
            _ => {}
        }
        out
    }
}

/// The properties a node kind accepts, in the order they are written.
///
/// The parser accepts them in any order; the serializer always emits this one.
pub fn property_order(kind: NodeKind) -> &'static [Property] {
    use Property::*;
    match kind {
        NodeKind::Entity => &[Id, Name, Description, SuperEntities, Attributes],
        NodeKind::EntityAttribute | NodeKind::EntityNodeAttribute | NodeKind::SourceObjectAttribute | NodeKind::TargetObjectAttribute => {
            &[Id, Name, Datatype, Length, Precision, Scale, Identifier, Description]
        }
        NodeKind::Relationship => &[
            Id,
            Name,
            Description,
            Parent,
            ParentRole,
            ParentCardinality,
            Child,
            ChildRole,
            ChildCardinality,
            Attributes,
        ],
        NodeKind::RelationshipAttribute => &[Parent, Child],
        NodeKind::Mapping => &[Id, Sources, Target],
        NodeKind::SourceObject => &[Id, Entity, Join, Dependencies, Conditions],
        NodeKind::SourceObjectDependency | NodeKind::AttributeMappingSource | NodeKind::AttributeMappingTarget => &[Value],
        NodeKind::JoinCondition => &[Left, Op, Right],
        NodeKind::TargetObject => &[Entity, Mappings],
        NodeKind::AttributeMapping => &[Attribute, Sources, Expression],
        NodeKind::SystemDiagram => &[Id, Name, Description, Nodes, Edges, InheritanceEdges],
        NodeKind::EntityNode => &[Id, Entity, X, Y, Width, Height],
        NodeKind::RelationshipEdge => &[Id, Relationship, SourceNode, TargetNode],
        NodeKind::InheritanceEdge => &[Id, BaseNode, SuperNode],
        NodeKind::ModelRoot => &[],
    }
}

/// The node type a reference slot expects its target to have.
pub fn expected_reference_kind(owner: NodeKind, property: Property) -> Option<NodeKind> {
    use NodeKind as K;
    use Property as P;
    let kind = match (owner, property) {
        (K::Entity, P::SuperEntities) => K::Entity,
        (K::Relationship, P::Parent | P::Child) => K::Entity,
        (K::RelationshipAttribute, P::Parent | P::Child) => K::EntityAttribute,
        (K::SourceObject, P::Entity) => K::Entity,
        (K::SourceObjectDependency, P::Value) => K::SourceObject,
        (K::JoinCondition, P::Left | P::Right) => K::SourceObjectAttribute,
        (K::TargetObject, P::Entity) => K::Entity,
        (K::AttributeMappingSource, P::Value) => K::SourceObjectAttribute,
        (K::AttributeMappingTarget, P::Value) => K::TargetObjectAttribute,
        (K::EntityNode, P::Entity) => K::Entity,
        (K::RelationshipEdge, P::Relationship) => K::Relationship,
        (K::RelationshipEdge, P::SourceNode | P::TargetNode) => K::EntityNode,
        (K::InheritanceEdge, P::BaseNode | P::SuperNode) => K::EntityNode,
        _ => return None,
    };
    Some(kind)
}

// ============================================================================
// PROPERTY VALUES
// ============================================================================

/// A uniform, read-only view of one property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    Id(&'a SmolStr),
    String(&'a str),
    Integer(i64),
    Number(f64),
    Bool(bool),
    /// A keyword value: cardinality, join kind or comparison operator.
    Keyword(&'static str),
    Reference(&'a Reference),
    References(&'a [Reference]),
    Node(NodeId),
    Nodes(&'a [NodeId]),
}

impl Node {
    /// The value stored in `property`, `None` when unset or not applicable.
    pub fn property_value(&self, property: Property) -> Option<PropertyValue<'_>> {
        use PropertyValue as V;
        fn id(value: &Option<SmolStr>) -> Option<PropertyValue<'_>> {
            value.as_ref().map(PropertyValue::Id)
        }
        fn string(value: &Option<String>) -> Option<PropertyValue<'_>> {
            value.as_deref().map(PropertyValue::String)
        }
        fn reference(value: &Option<Reference>) -> Option<PropertyValue<'_>> {
            value.as_ref().map(PropertyValue::Reference)
        }

        match (self, property) {
            (Node::ModelRoot(n), _) => n.content.map(V::Node),

            (Node::Entity(n), Property::Id) => id(&n.id),
            (Node::Entity(n), Property::Name) => string(&n.name),
            (Node::Entity(n), Property::Description) => string(&n.description),
            (Node::Entity(n), Property::SuperEntities) => Some(V::References(&n.super_entities)),
            (Node::Entity(n), Property::Attributes) => Some(V::Nodes(&n.attributes)),

            (Node::EntityAttribute(n), Property::Id) => id(&n.id),
            (Node::EntityAttribute(n), Property::Name) => string(&n.name),
            (Node::EntityAttribute(n), Property::Datatype) => string(&n.datatype),
            (Node::EntityAttribute(n), Property::Length) => n.length.map(V::Integer),
            (Node::EntityAttribute(n), Property::Precision) => n.precision.map(V::Integer),
            (Node::EntityAttribute(n), Property::Scale) => n.scale.map(V::Integer),
            (Node::EntityAttribute(n), Property::Identifier) => Some(V::Bool(n.identifier)),
            (Node::EntityAttribute(n), Property::Description) => string(&n.description),

            (Node::Relationship(n), Property::Id) => id(&n.id),
            (Node::Relationship(n), Property::Name) => string(&n.name),
            (Node::Relationship(n), Property::Description) => string(&n.description),
            (Node::Relationship(n), Property::Parent) => reference(&n.parent),
            (Node::Relationship(n), Property::ParentRole) => string(&n.parent_role),
            (Node::Relationship(n), Property::ParentCardinality) => {
                n.parent_cardinality.map(|c| V::Keyword(c.keyword()))
            }
            (Node::Relationship(n), Property::Child) => reference(&n.child),
            (Node::Relationship(n), Property::ChildRole) => string(&n.child_role),
            (Node::Relationship(n), Property::ChildCardinality) => {
                n.child_cardinality.map(|c| V::Keyword(c.keyword()))
            }
            (Node::Relationship(n), Property::Attributes) => Some(V::Nodes(&n.attributes)),

            (Node::RelationshipAttribute(n), Property::Parent) => reference(&n.parent),
            (Node::RelationshipAttribute(n), Property::Child) => reference(&n.child),

            (Node::Mapping(n), Property::Id) => id(&n.id),
            (Node::Mapping(n), Property::Sources) => Some(V::Nodes(&n.sources)),
            (Node::Mapping(n), Property::Target) => n.target.map(V::Node),

            (Node::SourceObject(n), Property::Id) => id(&n.id),
            (Node::SourceObject(n), Property::Entity) => reference(&n.entity),
            (Node::SourceObject(n), Property::Join) => n.join.map(|j| V::Keyword(j.keyword())),
            (Node::SourceObject(n), Property::Dependencies) => Some(V::Nodes(&n.dependencies)),
            (Node::SourceObject(n), Property::Conditions) => Some(V::Nodes(&n.conditions)),

            (Node::SourceObjectDependency(n), Property::Value) => Some(V::Reference(&n.source)),

            (Node::JoinCondition(n), Property::Left) => Some(V::Reference(&n.left)),
            (Node::JoinCondition(n), Property::Op) => Some(V::Keyword(n.op.symbol())),
            (Node::JoinCondition(n), Property::Right) => Some(match &n.right {
                Operand::Reference(r) => V::Reference(r),
                Operand::Number(value) => V::Number(*value),
                Operand::String(value) => V::String(value),
            }),

            (Node::TargetObject(n), Property::Entity) => reference(&n.entity),
            (Node::TargetObject(n), Property::Mappings) => Some(V::Nodes(&n.mappings)),

            (Node::AttributeMapping(n), Property::Attribute) => n.attribute.map(V::Node),
            (Node::AttributeMapping(n), Property::Sources) => Some(V::Nodes(&n.sources)),
            (Node::AttributeMapping(n), Property::Expression) => string(&n.expression),

            (Node::AttributeMappingSource(n), Property::Value) => Some(V::Reference(&n.value)),
            (Node::AttributeMappingTarget(n), Property::Value) => Some(V::Reference(&n.value)),

            (Node::SystemDiagram(n), Property::Id) => id(&n.id),
            (Node::SystemDiagram(n), Property::Name) => string(&n.name),
            (Node::SystemDiagram(n), Property::Description) => string(&n.description),
            (Node::SystemDiagram(n), Property::Nodes) => Some(V::Nodes(&n.nodes)),
            (Node::SystemDiagram(n), Property::Edges) => Some(V::Nodes(&n.edges)),
            (Node::SystemDiagram(n), Property::InheritanceEdges) => {
                Some(V::Nodes(&n.inheritance_edges))
            }

            (Node::EntityNode(n), Property::Id) => id(&n.id),
            (Node::EntityNode(n), Property::Entity) => reference(&n.entity),
            (Node::EntityNode(n), Property::X) => n.x.map(V::Number),
            (Node::EntityNode(n), Property::Y) => n.y.map(V::Number),
            (Node::EntityNode(n), Property::Width) => n.width.map(V::Number),
            (Node::EntityNode(n), Property::Height) => n.height.map(V::Number),

            (Node::RelationshipEdge(n), Property::Id) => id(&n.id),
            (Node::RelationshipEdge(n), Property::Relationship) => reference(&n.relationship),
            (Node::RelationshipEdge(n), Property::SourceNode) => reference(&n.source_node),
            (Node::RelationshipEdge(n), Property::TargetNode) => reference(&n.target_node),

            (Node::InheritanceEdge(n), Property::Id) => id(&n.id),
            (Node::InheritanceEdge(n), Property::BaseNode) => reference(&n.base_node),
            (Node::InheritanceEdge(n), Property::SuperNode) => reference(&n.super_node),

            _ => None,
        }
    }
}

// ============================================================================
// ARENA
// ============================================================================

/// A node plus its position in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub node: Node,
    pub container: Option<NodeId>,
    pub range: TextRange,
    /// Ranges of the property values written for this node, in source order.
    pub property_ranges: Vec<(Property, TextRange)>,
}

/// All nodes of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    /// An arena holding only an empty [`ModelRoot`].
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                node: Node::ModelRoot(ModelRoot::default()),
                container: None,
                range: TextRange::default(),
                property_ranges: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The entity, relationship, mapping or diagram held by the root.
    pub fn root_content(&self) -> Option<NodeId> {
        match &self.node(self.root) {
            Node::ModelRoot(root) => root.content,
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// The node for `id`, or `None` when `id` belongs to another arena.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).map(|data| &data.node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()].node
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    pub fn container(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].container
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    /// Range of a property value, falling back to the node range.
    pub fn property_range(&self, id: NodeId, property: Property) -> TextRange {
        let data = self.data(id);
        data.property_ranges
            .iter()
            .find(|(p, _)| *p == property)
            .map_or(data.range, |(_, range)| *range)
    }

    /// All node ids in allocation order (parents before children).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).children()
    }

    /// Pre-order traversal below `id`, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Nearest container (self included) satisfying `pred`.
    pub fn ancestor_where(&self, id: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if pred(self.node(node)) {
                return Some(node);
            }
            current = self.container(node);
        }
        None
    }

    // ------------------------------------------------------------------------
    // Construction (parser only)
    // ------------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, node: Node, container: NodeId, range: TextRange) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            node,
            container: Some(container),
            range,
            property_ranges: Vec::new(),
        });
        id
    }

    pub(crate) fn set_property_ranges(&mut self, id: NodeId, ranges: Vec<(Property, TextRange)>) {
        self.nodes[id.index()].property_ranges = ranges;
    }

    pub(crate) fn finish(
        &mut self,
        id: NodeId,
        node: Node,
        range: TextRange,
        property_ranges: Vec<(Property, TextRange)>,
    ) {
        let data = &mut self.nodes[id.index()];
        data.node = node;
        data.range = range;
        data.property_ranges = property_ranges;
    }
}

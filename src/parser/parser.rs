//! Recursive-descent parser for CrossModel documents.
//!
//! Consumes the indentation-aware token stream and builds the typed
//! [`Ast`]. Blocks are `key:` lines between INDENT and DEDENT; list items
//! start with `-` and continue until the next `-` or the end of the block.
//!
//! The parser never panics on user input. Lexing failures stop the parse
//! with a single error; everything else is reported and skipped line by line.

use smol_str::SmolStr;

use super::ast::*;
use super::errors::{ErrorCode, SyntaxError};
use super::indent::tokenize;
use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use crate::base::{TextRange, TextSize};

/// Result of parsing a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    pub ast: Ast,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the parse was stopped by the tokenizer.
    pub fn has_lex_error(&self) -> bool {
        self.errors.iter().any(|e| e.code.is_lexical())
    }
}

/// Parse a CrossModel document.
pub fn parse(text: &str) -> Parse {
    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::debug!(error = %err, "tokenization failed");
            return Parse {
                ast: Ast::new(),
                errors: vec![err.into()],
            };
        }
    };

    let mut parser = Parser::new(tokens, TextSize::of(text));
    parser.parse_root();
    Parse {
        ast: parser.ast,
        errors: parser.errors,
    }
}

/// Map a `key:` keyword to its property slot.
fn property_for_key(kind: SyntaxKind) -> Option<Property> {
    let property = match kind {
        SyntaxKind::ID_KW => Property::Id,
        SyntaxKind::NAME_KW => Property::Name,
        SyntaxKind::DESCRIPTION_KW => Property::Description,
        SyntaxKind::INHERITS_KW => Property::SuperEntities,
        SyntaxKind::ATTRIBUTES_KW => Property::Attributes,
        SyntaxKind::DATATYPE_KW => Property::Datatype,
        SyntaxKind::LENGTH_KW => Property::Length,
        SyntaxKind::PRECISION_KW => Property::Precision,
        SyntaxKind::SCALE_KW => Property::Scale,
        SyntaxKind::IDENTIFIER_KW => Property::Identifier,
        SyntaxKind::PARENT_KW => Property::Parent,
        SyntaxKind::PARENT_ROLE_KW => Property::ParentRole,
        SyntaxKind::PARENT_CARDINALITY_KW => Property::ParentCardinality,
        SyntaxKind::CHILD_KW => Property::Child,
        SyntaxKind::CHILD_ROLE_KW => Property::ChildRole,
        SyntaxKind::CHILD_CARDINALITY_KW => Property::ChildCardinality,
        SyntaxKind::SOURCES_KW => Property::Sources,
        SyntaxKind::TARGET_KW => Property::Target,
        SyntaxKind::JOIN_KW => Property::Join,
        SyntaxKind::DEPENDENCIES_KW => Property::Dependencies,
        SyntaxKind::CONDITIONS_KW => Property::Conditions,
        SyntaxKind::MAPPINGS_KW => Property::Mappings,
        SyntaxKind::ATTRIBUTE_KW => Property::Attribute,
        SyntaxKind::EXPRESSION_KW => Property::Expression,
        SyntaxKind::ENTITY_KW => Property::Entity,
        SyntaxKind::RELATIONSHIP_KW => Property::Relationship,
        SyntaxKind::NODES_KW => Property::Nodes,
        SyntaxKind::EDGES_KW => Property::Edges,
        SyntaxKind::INHERITANCE_EDGES_KW => Property::InheritanceEdges,
        SyntaxKind::X_KW => Property::X,
        SyntaxKind::Y_KW => Property::Y,
        SyntaxKind::WIDTH_KW => Property::Width,
        SyntaxKind::HEIGHT_KW => Property::Height,
        SyntaxKind::SOURCE_NODE_KW => Property::SourceNode,
        SyntaxKind::TARGET_NODE_KW => Property::TargetNode,
        SyntaxKind::BASE_NODE_KW => Property::BaseNode,
        SyntaxKind::SUPER_NODE_KW => Property::SuperNode,
        _ => return None,
    };
    Some(property)
}

/// Strip the keyword escape from an identifier token.
fn unescape_id(text: &str) -> &str {
    text.strip_prefix('^').unwrap_or(text)
}

/// Decode a double-quoted string literal.
pub fn unescape_string(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// End of the last consumed token that carries text.
    last_end: TextSize,
    ast: Ast,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>, eof: TextSize) -> Self {
        let mut tokens: Vec<Token<'a>> = tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        tokens.push(Token {
            kind: SyntaxKind::EOF,
            text: "",
            offset: eof,
        });
        Self {
            tokens,
            pos: 0,
            last_end: TextSize::new(0),
            ast: Ast::new(),
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn current(&self) -> &Token<'a> {
        // The EOF sentinel is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    fn bump(&mut self) -> Token<'a> {
        let token = self.current().clone();
        if token.kind != SyntaxKind::EOF {
            self.pos += 1;
        }
        if !token.text.is_empty() && token.kind != SyntaxKind::NEWLINE {
            self.last_end = token.range().end();
        }
        token
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self.current().kind.display_name();
        self.error(
            format!("expected {}, found {}", kind.display_name(), found),
            ErrorCode::E0902,
        );
        false
    }

    fn skip_newlines(&mut self) {
        while self.eat(SyntaxKind::NEWLINE) {}
    }

    // =========================================================================
    // Errors and recovery
    // =========================================================================

    fn error(&mut self, message: impl Into<String>, code: ErrorCode) {
        let range = self.current().range();
        self.error_at(range, message, code);
    }

    fn error_at(&mut self, range: TextRange, message: impl Into<String>, code: ErrorCode) {
        self.errors.push(SyntaxError::new(message, range, code));
    }

    /// Skip the rest of the line and any block nested below it.
    ///
    /// Stops before a DEDENT that closes the current block.
    fn recover_line(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                SyntaxKind::EOF => return,
                SyntaxKind::DEDENT if depth == 0 => return,
                SyntaxKind::DEDENT => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        return;
                    }
                }
                SyntaxKind::INDENT => {
                    depth += 1;
                    self.bump();
                }
                SyntaxKind::NEWLINE if depth == 0 => {
                    self.bump();
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.skip_newlines();
        if self.at(SyntaxKind::INDENT) {
            self.skip_block();
        }
    }

    /// Skip a balanced INDENT ... DEDENT block.
    fn skip_block(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                SyntaxKind::EOF => return,
                SyntaxKind::INDENT => depth += 1,
                SyntaxKind::DEDENT => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Consume the end of a scalar line.
    fn end_line(&mut self) {
        if self.eat(SyntaxKind::NEWLINE) || self.at_any(&[SyntaxKind::DEDENT, SyntaxKind::EOF]) {
            return;
        }
        let found = self.current().kind.display_name();
        self.error(format!("expected end of line, found {found}"), ErrorCode::E0201);
        self.recover_line();
    }

    // =========================================================================
    // Structure
    // =========================================================================

    fn parse_root(&mut self) {
        let root = self.ast.root();
        self.skip_newlines();

        let content = match self.current_kind() {
            SyntaxKind::EOF => None,
            SyntaxKind::ENTITY_KW => self.root_object(|p| p.entity(root)),
            SyntaxKind::RELATIONSHIP_KW => self.root_object(|p| p.relationship(root)),
            SyntaxKind::MAPPING_KW => self.root_object(|p| p.mapping(root)),
            SyntaxKind::SYSTEM_DIAGRAM_KW | SyntaxKind::DIAGRAM_KW => {
                self.root_object(|p| p.system_diagram(root))
            }
            _ => {
                self.error(ErrorCode::E0903.default_message(), ErrorCode::E0903);
                None
            }
        };

        if content.is_some() {
            self.skip_newlines();
            if !self.at(SyntaxKind::EOF) {
                self.error("unexpected content after the document root", ErrorCode::E0901);
            }
        }

        let end = self.tokens.last().map_or(TextSize::new(0), |t| t.offset);
        self.ast.finish(
            root,
            Node::ModelRoot(ModelRoot { content }),
            TextRange::new(TextSize::new(0), end),
            Vec::new(),
        );
    }

    fn root_object(&mut self, body: impl FnOnce(&mut Self) -> NodeId) -> Option<NodeId> {
        self.bump();
        if !self.expect(SyntaxKind::COLON) {
            return None;
        }
        self.object(body)
    }

    /// `key:` followed by an indented block.
    fn object<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if !self.eat(SyntaxKind::NEWLINE) {
            self.error(ErrorCode::E0202.default_message(), ErrorCode::E0202);
            self.recover_line();
            return None;
        }
        self.skip_newlines();
        if !self.eat(SyntaxKind::INDENT) {
            self.error(ErrorCode::E0202.default_message(), ErrorCode::E0202);
            return None;
        }
        let value = body(self);
        self.eat(SyntaxKind::DEDENT);
        Some(value)
    }

    /// `key:` followed by an indented list of `- ` items.
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        if !self.eat(SyntaxKind::NEWLINE) {
            self.error(ErrorCode::E0202.default_message(), ErrorCode::E0202);
            self.recover_line();
            return items;
        }
        self.skip_newlines();
        if !self.eat(SyntaxKind::INDENT) {
            self.error(ErrorCode::E0202.default_message(), ErrorCode::E0202);
            return items;
        }
        loop {
            self.skip_newlines();
            match self.current_kind() {
                SyntaxKind::DEDENT => {
                    self.bump();
                    break;
                }
                SyntaxKind::EOF => break,
                SyntaxKind::DASH => {
                    self.bump();
                    if let Some(value) = item(self) {
                        items.push(value);
                    }
                }
                _ => {
                    self.error(ErrorCode::E0203.default_message(), ErrorCode::E0203);
                    self.recover_line();
                }
            }
        }
        items
    }

    /// Parse `key: value` lines of one block into `value`.
    ///
    /// Inside a list item the block also ends at the next `-`.
    fn block(
        &mut self,
        kind: NodeKind,
        in_item: bool,
        mut value: impl FnMut(&mut Self, Property),
    ) -> Vec<(Property, TextRange)> {
        let allowed = property_order(kind);
        let mut ranges: Vec<(Property, TextRange)> = Vec::new();

        loop {
            self.skip_newlines();
            match self.current_kind() {
                SyntaxKind::EOF | SyntaxKind::DEDENT => break,
                SyntaxKind::DASH if in_item => break,
                _ => {}
            }

            let key = self.current().clone();
            let property = property_for_key(key.kind).filter(|p| allowed.contains(p));
            let Some(property) = property else {
                let message = if key.kind.is_property_key() {
                    format!("'{}' is not a property of {}", key.text, kind.label())
                } else {
                    format!("expected a property of {}, found {}", kind.label(), key.kind.display_name())
                };
                let expected: Vec<&str> = allowed.iter().filter_map(|p| p.keyword()).collect();
                self.errors.push(
                    SyntaxError::new(message, key.range(), ErrorCode::E0302)
                        .with_hint(format!("expected one of: {}", expected.join(", "))),
                );
                self.recover_line();
                continue;
            };

            if ranges.iter().any(|(p, _)| *p == property) {
                self.error_at(
                    key.range(),
                    format!("duplicate property '{}'", key.text),
                    ErrorCode::E0303,
                );
                self.recover_line();
                continue;
            }

            self.bump();
            if !self.expect(SyntaxKind::COLON) {
                self.recover_line();
                continue;
            }
            let start = self.current().offset;
            value(self, property);
            let end = self.last_end.max(start);
            ranges.push((property, TextRange::new(start, end)));
        }

        ranges
    }

    fn finish_node(&mut self, id: NodeId, node: Node, start: TextSize, ranges: Vec<(Property, TextRange)>) {
        let end = self.last_end.max(start);
        self.ast.finish(id, node, TextRange::new(start, end), ranges);
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// `id: Name`
    fn id_value(&mut self) -> Option<SmolStr> {
        if self.at(SyntaxKind::IDENT) {
            let token = self.bump();
            self.end_line();
            return Some(SmolStr::new(unescape_id(token.text)));
        }
        let found = self.current().clone();
        let mut err = SyntaxError::new(
            format!("expected identifier, found {}", found.kind.display_name()),
            found.range(),
            ErrorCode::E0304,
        );
        if found.kind.is_keyword() {
            err = err.with_hint(format!("escape the keyword as '^{}'", found.text));
        }
        self.errors.push(err);
        self.recover_line();
        None
    }

    fn string_value(&mut self) -> Option<String> {
        if self.at(SyntaxKind::STRING) {
            let token = self.bump();
            self.end_line();
            return Some(unescape_string(token.text));
        }
        self.invalid_value("string");
        None
    }

    /// A string value together with the range of its literal.
    fn string_value_with_range(&mut self) -> Option<(String, TextRange)> {
        let range = self.current().range();
        self.string_value().map(|s| (s, range))
    }

    fn number_value(&mut self) -> Option<f64> {
        if self.at(SyntaxKind::NUMBER) {
            let token = self.bump();
            if let Ok(value) = token.text.parse::<f64>() {
                self.end_line();
                return Some(value);
            }
        }
        self.invalid_value("number");
        None
    }

    fn integer_value(&mut self) -> Option<i64> {
        if self.at(SyntaxKind::NUMBER) {
            if let Ok(value) = self.current().text.parse::<i64>() {
                self.bump();
                self.end_line();
                return Some(value);
            }
        }
        self.invalid_value("integer");
        None
    }

    fn bool_value(&mut self) -> bool {
        let value = match self.current_kind() {
            SyntaxKind::TRUE_KW => true,
            SyntaxKind::FALSE_KW => false,
            _ => {
                self.invalid_value("'true' or 'false'");
                return false;
            }
        };
        self.bump();
        self.end_line();
        value
    }

    fn cardinality_value(&mut self) -> Option<Cardinality> {
        let value = match self.current_kind() {
            SyntaxKind::ZERO_ONE_KW => Cardinality::ZeroOne,
            SyntaxKind::ONE_KW => Cardinality::One,
            SyntaxKind::MULTIPLE_KW => Cardinality::Multiple,
            _ => {
                self.invalid_value("'zero-one', 'one' or 'multiple'");
                return None;
            }
        };
        self.bump();
        self.end_line();
        Some(value)
    }

    fn join_value(&mut self) -> Option<JoinKind> {
        let value = match self.current_kind() {
            SyntaxKind::FROM_KW => JoinKind::From,
            SyntaxKind::INNER_JOIN_KW => JoinKind::InnerJoin,
            SyntaxKind::CROSS_JOIN_KW => JoinKind::CrossJoin,
            SyntaxKind::LEFT_JOIN_KW => JoinKind::LeftJoin,
            SyntaxKind::APPLY_KW => JoinKind::Apply,
            _ => {
                self.invalid_value("a join kind");
                return None;
            }
        };
        self.bump();
        self.end_line();
        Some(value)
    }

    fn invalid_value(&mut self, expected: &str) {
        let found = self.current().kind.display_name();
        self.error(format!("expected {expected}, found {found}"), ErrorCode::E0304);
        self.recover_line();
    }

    /// A dot-joined reference such as `Customer` or `CustomerSource.Id`.
    /// Segments after a dot may be bare keywords, as in `Src.name`.
    ///
    /// Reports but does not recover.
    fn reference(&mut self) -> Option<Reference> {
        let start = self.current().offset;
        let mut text = String::new();
        loop {
            let qualified = !text.is_empty();
            let kind = self.current().kind;
            if !(kind == SyntaxKind::IDENT || (qualified && kind.is_keyword())) {
                let found = self.current().clone();
                let mut err = SyntaxError::new(
                    format!("expected reference, found {}", found.kind.display_name()),
                    found.range(),
                    ErrorCode::E0304,
                );
                if found.kind.is_keyword() {
                    err = err.with_hint(format!("escape the keyword as '^{}'", found.text));
                }
                self.errors.push(err);
                return None;
            }
            let segment = self.bump();
            text.push_str(unescape_id(segment.text));
            if !self.eat(SyntaxKind::DOT) {
                break;
            }
            text.push('.');
        }
        Some(Reference::new(text, TextRange::new(start, self.last_end)))
    }

    /// A reference filling the rest of the line.
    fn reference_value(&mut self) -> Option<Reference> {
        match self.reference() {
            Some(reference) => {
                self.end_line();
                Some(reference)
            }
            None => {
                self.recover_line();
                None
            }
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    fn entity(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(Node::Entity(Entity::default()), container, TextRange::empty(start));
        let mut entity = Entity::default();
        let ranges = self.block(NodeKind::Entity, false, |p, property| match property {
            Property::Id => entity.id = p.id_value(),
            Property::Name => entity.name = p.string_value(),
            Property::Description => entity.description = p.string_value(),
            Property::SuperEntities => entity.super_entities = p.list(|p| p.reference_value()),
            Property::Attributes => entity.attributes = p.list(|p| Some(p.entity_attribute(id))),
            _ => {}
        });
        self.finish_node(id, Node::Entity(entity), start, ranges);
        id
    }

    fn entity_attribute(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::EntityAttribute(EntityAttribute::default()),
            container,
            TextRange::empty(start),
        );
        let mut attr = EntityAttribute::default();
        let ranges = self.block(NodeKind::EntityAttribute, true, |p, property| match property {
            Property::Id => attr.id = p.id_value(),
            Property::Name => attr.name = p.string_value(),
            Property::Datatype => attr.datatype = p.string_value(),
            Property::Length => attr.length = p.integer_value(),
            Property::Precision => attr.precision = p.integer_value(),
            Property::Scale => attr.scale = p.integer_value(),
            Property::Identifier => attr.identifier = p.bool_value(),
            Property::Description => attr.description = p.string_value(),
            _ => {}
        });
        self.finish_node(id, Node::EntityAttribute(attr), start, ranges);
        id
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    fn relationship(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::Relationship(Relationship::default()),
            container,
            TextRange::empty(start),
        );
        let mut rel = Relationship::default();
        let ranges = self.block(NodeKind::Relationship, false, |p, property| match property {
            Property::Id => rel.id = p.id_value(),
            Property::Name => rel.name = p.string_value(),
            Property::Description => rel.description = p.string_value(),
            Property::Parent => rel.parent = p.reference_value(),
            Property::ParentRole => rel.parent_role = p.string_value(),
            Property::ParentCardinality => rel.parent_cardinality = p.cardinality_value(),
            Property::Child => rel.child = p.reference_value(),
            Property::ChildRole => rel.child_role = p.string_value(),
            Property::ChildCardinality => rel.child_cardinality = p.cardinality_value(),
            Property::Attributes => {
                rel.attributes = p.list(|p| Some(p.relationship_attribute(id)))
            }
            _ => {}
        });
        self.finish_node(id, Node::Relationship(rel), start, ranges);
        id
    }

    fn relationship_attribute(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::RelationshipAttribute(RelationshipAttribute::default()),
            container,
            TextRange::empty(start),
        );
        let mut attr = RelationshipAttribute::default();
        let ranges = self.block(NodeKind::RelationshipAttribute, true, |p, property| match property {
            Property::Parent => attr.parent = p.reference_value(),
            Property::Child => attr.child = p.reference_value(),
            _ => {}
        });
        self.finish_node(id, Node::RelationshipAttribute(attr), start, ranges);
        id
    }

    // =========================================================================
    // Mappings
    // =========================================================================

    fn mapping(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(Node::Mapping(Mapping::default()), container, TextRange::empty(start));
        let mut mapping = Mapping::default();
        let ranges = self.block(NodeKind::Mapping, false, |p, property| match property {
            Property::Id => mapping.id = p.id_value(),
            Property::Sources => mapping.sources = p.list(|p| Some(p.source_object(id))),
            Property::Target => mapping.target = p.object(|p| p.target_object(id)),
            _ => {}
        });
        self.finish_node(id, Node::Mapping(mapping), start, ranges);
        id
    }

    fn source_object(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::SourceObject(SourceObject::default()),
            container,
            TextRange::empty(start),
        );
        let mut source = SourceObject::default();
        let ranges = self.block(NodeKind::SourceObject, true, |p, property| match property {
            Property::Id => source.id = p.id_value(),
            Property::Entity => source.entity = p.reference_value(),
            Property::Join => source.join = p.join_value(),
            Property::Dependencies => source.dependencies = p.list(|p| p.dependency(id)),
            Property::Conditions => source.conditions = p.list(|p| p.join_condition(id)),
            _ => {}
        });
        self.finish_node(id, Node::SourceObject(source), start, ranges);
        id
    }

    /// `- SourceId`
    fn dependency(&mut self, container: NodeId) -> Option<NodeId> {
        let source = self.reference_value()?;
        let range = source.range;
        let node = Node::SourceObjectDependency(SourceObjectDependency { source });
        Some(self.alloc_leaf(node, container, range, Property::Value))
    }

    /// `- Left.attr <op> Right.attr`
    fn join_condition(&mut self, container: NodeId) -> Option<NodeId> {
        let start = self.current().offset;
        let Some(left) = self.reference() else {
            self.recover_line();
            return None;
        };

        let op = match self.current_kind() {
            SyntaxKind::EQ => Operator::Eq,
            SyntaxKind::BANG_EQ => Operator::NotEq,
            SyntaxKind::LT => Operator::Lt,
            SyntaxKind::LT_EQ => Operator::LtEq,
            SyntaxKind::GT => Operator::Gt,
            SyntaxKind::GT_EQ => Operator::GtEq,
            _ => {
                let found = self.current().kind.display_name();
                self.error(
                    format!("expected a comparison operator, found {found}"),
                    ErrorCode::E0403,
                );
                self.recover_line();
                return None;
            }
        };
        let op_range = self.bump().range();

        let right_start = self.current().offset;
        let right = match self.current_kind() {
            SyntaxKind::NUMBER => {
                let token = self.bump();
                Operand::Number(token.text.parse::<f64>().unwrap_or_default())
            }
            SyntaxKind::STRING => Operand::String(unescape_string(self.bump().text)),
            SyntaxKind::IDENT => match self.reference() {
                Some(reference) => Operand::Reference(reference),
                None => {
                    self.recover_line();
                    return None;
                }
            },
            _ => {
                let found = self.current().kind.display_name();
                self.error(
                    format!("expected an attribute, number or string, found {found}"),
                    ErrorCode::E0401,
                );
                self.recover_line();
                return None;
            }
        };
        let right_range = TextRange::new(right_start, self.last_end);
        self.end_line();

        let left_range = left.range;
        let range = TextRange::new(start, right_range.end());
        let id = self.ast.alloc(
            Node::JoinCondition(JoinCondition { left, op, right }),
            container,
            range,
        );
        self.ast.set_property_ranges(
            id,
            vec![
                (Property::Left, left_range),
                (Property::Op, op_range),
                (Property::Right, right_range),
            ],
        );
        Some(id)
    }

    fn target_object(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::TargetObject(TargetObject::default()),
            container,
            TextRange::empty(start),
        );
        let mut target = TargetObject::default();
        let ranges = self.block(NodeKind::TargetObject, false, |p, property| match property {
            Property::Entity => target.entity = p.reference_value(),
            Property::Mappings => target.mappings = p.list(|p| Some(p.attribute_mapping(id))),
            _ => {}
        });
        self.finish_node(id, Node::TargetObject(target), start, ranges);
        id
    }

    fn attribute_mapping(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::AttributeMapping(AttributeMapping::default()),
            container,
            TextRange::empty(start),
        );
        let mut mapping = AttributeMapping::default();
        let ranges = self.block(NodeKind::AttributeMapping, true, |p, property| match property {
            Property::Attribute => {
                mapping.attribute = p.reference_value().map(|value| {
                    let range = value.range;
                    let node = Node::AttributeMappingTarget(AttributeMappingTarget { value });
                    p.alloc_leaf(node, id, range, Property::Value)
                })
            }
            Property::Sources => {
                mapping.sources = p.list(|p| {
                    let value = p.reference_value()?;
                    let range = value.range;
                    let node = Node::AttributeMappingSource(AttributeMappingSource { value });
                    Some(p.alloc_leaf(node, id, range, Property::Value))
                })
            }
            Property::Expression => {
                if let Some((text, range)) = p.string_value_with_range() {
                    mapping.expression = Some(text);
                    mapping.expression_range = Some(range);
                }
            }
            _ => {}
        });
        self.finish_node(id, Node::AttributeMapping(mapping), start, ranges);
        id
    }

    fn alloc_leaf(&mut self, node: Node, container: NodeId, range: TextRange, property: Property) -> NodeId {
        let id = self.ast.alloc(node, container, range);
        self.ast.set_property_ranges(id, vec![(property, range)]);
        id
    }

    // =========================================================================
    // System diagrams
    // =========================================================================

    fn system_diagram(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::SystemDiagram(SystemDiagram::default()),
            container,
            TextRange::empty(start),
        );
        let mut diagram = SystemDiagram::default();
        let ranges = self.block(NodeKind::SystemDiagram, false, |p, property| match property {
            Property::Id => diagram.id = p.id_value(),
            Property::Name => diagram.name = p.string_value(),
            Property::Description => diagram.description = p.string_value(),
            Property::Nodes => diagram.nodes = p.list(|p| Some(p.entity_node(id))),
            Property::Edges => diagram.edges = p.list(|p| Some(p.relationship_edge(id))),
            Property::InheritanceEdges => {
                diagram.inheritance_edges = p.list(|p| Some(p.inheritance_edge(id)))
            }
            _ => {}
        });
        self.finish_node(id, Node::SystemDiagram(diagram), start, ranges);
        id
    }

    fn entity_node(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::EntityNode(EntityNode::default()),
            container,
            TextRange::empty(start),
        );
        let mut node = EntityNode::default();
        let ranges = self.block(NodeKind::EntityNode, true, |p, property| match property {
            Property::Id => node.id = p.id_value(),
            Property::Entity => node.entity = p.reference_value(),
            Property::X => node.x = p.number_value(),
            Property::Y => node.y = p.number_value(),
            Property::Width => node.width = p.number_value(),
            Property::Height => node.height = p.number_value(),
            _ => {}
        });
        self.finish_node(id, Node::EntityNode(node), start, ranges);
        id
    }

    fn relationship_edge(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::RelationshipEdge(RelationshipEdge::default()),
            container,
            TextRange::empty(start),
        );
        let mut edge = RelationshipEdge::default();
        let ranges = self.block(NodeKind::RelationshipEdge, true, |p, property| match property {
            Property::Id => edge.id = p.id_value(),
            Property::Relationship => edge.relationship = p.reference_value(),
            Property::SourceNode => edge.source_node = p.reference_value(),
            Property::TargetNode => edge.target_node = p.reference_value(),
            _ => {}
        });
        self.finish_node(id, Node::RelationshipEdge(edge), start, ranges);
        id
    }

    fn inheritance_edge(&mut self, container: NodeId) -> NodeId {
        let start = self.current().offset;
        let id = self.ast.alloc(
            Node::InheritanceEdge(InheritanceEdge::default()),
            container,
            TextRange::empty(start),
        );
        let mut edge = InheritanceEdge::default();
        let ranges = self.block(NodeKind::InheritanceEdge, true, |p, property| match property {
            Property::Id => edge.id = p.id_value(),
            Property::BaseNode => edge.base_node = p.reference_value(),
            Property::SuperNode => edge.super_node = p.reference_value(),
            _ => {}
        });
        self.finish_node(id, Node::InheritanceEdge(edge), start, ranges);
        id
    }
}

//! Token kinds produced by the CrossModel lexers.
//!
//! The base lexer produces every kind except [`SyntaxKind::INDENT`] and
//! [`SyntaxKind::DEDENT`], which are synthesized by the indentation layer.

/// All token kinds of the CrossModel language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA AND LAYOUT
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,
    NEWLINE,
    INDENT,
    DEDENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // Customer, ^entity, a-b
    NUMBER, // 42, -1.5
    STRING, // "hello"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    COLON, // :
    DOT,   // .
    DASH,  // -
    EQ,    // =
    BANG_EQ, // !=
    LT,    // <
    LT_EQ, // <=
    GT,    // >
    GT_EQ, // >=

    // =========================================================================
    // KEYWORDS - root kinds
    // =========================================================================
    ENTITY_KW,
    RELATIONSHIP_KW,
    MAPPING_KW,
    SYSTEM_DIAGRAM_KW,
    DIAGRAM_KW,

    // =========================================================================
    // KEYWORDS - property keys
    // =========================================================================
    ID_KW,
    NAME_KW,
    DESCRIPTION_KW,
    INHERITS_KW,
    ATTRIBUTES_KW,
    DATATYPE_KW,
    LENGTH_KW,
    PRECISION_KW,
    SCALE_KW,
    IDENTIFIER_KW,
    PARENT_KW,
    PARENT_ROLE_KW,
    PARENT_CARDINALITY_KW,
    CHILD_KW,
    CHILD_ROLE_KW,
    CHILD_CARDINALITY_KW,
    SOURCES_KW,
    TARGET_KW,
    JOIN_KW,
    DEPENDENCIES_KW,
    CONDITIONS_KW,
    MAPPINGS_KW,
    ATTRIBUTE_KW,
    EXPRESSION_KW,
    NODES_KW,
    EDGES_KW,
    INHERITANCE_EDGES_KW,
    X_KW,
    Y_KW,
    WIDTH_KW,
    HEIGHT_KW,
    SOURCE_NODE_KW,
    TARGET_NODE_KW,
    BASE_NODE_KW,
    SUPER_NODE_KW,

    // =========================================================================
    // KEYWORDS - values
    // =========================================================================
    TRUE_KW,
    FALSE_KW,
    FROM_KW,
    INNER_JOIN_KW,
    CROSS_JOIN_KW,
    LEFT_JOIN_KW,
    APPLY_KW,
    ZERO_ONE_KW,
    ONE_KW,
    MULTIPLE_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    EOF,
}

impl SyntaxKind {
    /// Tokens the grammar never sees.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
    }

    /// Any reserved word, including value keywords such as `from` or `one`.
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::ENTITY_KW as u16) && (self as u16) <= (SyntaxKind::MULTIPLE_KW as u16)
    }

    /// Keywords that may open a `key:` line inside a block.
    pub fn is_property_key(self) -> bool {
        (self as u16) >= (SyntaxKind::ENTITY_KW as u16) && (self as u16) <= (SyntaxKind::SUPER_NODE_KW as u16)
    }

    /// Keywords that open a document.
    pub fn is_root_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::ENTITY_KW
                | SyntaxKind::RELATIONSHIP_KW
                | SyntaxKind::MAPPING_KW
                | SyntaxKind::SYSTEM_DIAGRAM_KW
                | SyntaxKind::DIAGRAM_KW
        )
    }

    /// Human-readable description used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            SyntaxKind::WHITESPACE => "whitespace",
            SyntaxKind::COMMENT => "comment",
            SyntaxKind::NEWLINE => "newline",
            SyntaxKind::INDENT => "indentation",
            SyntaxKind::DEDENT => "end of block",
            SyntaxKind::IDENT => "identifier",
            SyntaxKind::NUMBER => "number",
            SyntaxKind::STRING => "string",
            SyntaxKind::COLON => "':'",
            SyntaxKind::DOT => "'.'",
            SyntaxKind::DASH => "'-'",
            SyntaxKind::EQ => "'='",
            SyntaxKind::BANG_EQ => "'!='",
            SyntaxKind::LT => "'<'",
            SyntaxKind::LT_EQ => "'<='",
            SyntaxKind::GT => "'>'",
            SyntaxKind::GT_EQ => "'>='",
            SyntaxKind::ERROR => "invalid token",
            SyntaxKind::EOF => "end of file",
            kind => kind.keyword_text().unwrap_or("keyword"),
        }
    }

    /// Source text of a keyword kind.
    pub fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::ENTITY_KW => "entity",
            SyntaxKind::RELATIONSHIP_KW => "relationship",
            SyntaxKind::MAPPING_KW => "mapping",
            SyntaxKind::SYSTEM_DIAGRAM_KW => "systemDiagram",
            SyntaxKind::DIAGRAM_KW => "diagram",
            SyntaxKind::ID_KW => "id",
            SyntaxKind::NAME_KW => "name",
            SyntaxKind::DESCRIPTION_KW => "description",
            SyntaxKind::INHERITS_KW => "inherits",
            SyntaxKind::ATTRIBUTES_KW => "attributes",
            SyntaxKind::DATATYPE_KW => "datatype",
            SyntaxKind::LENGTH_KW => "length",
            SyntaxKind::PRECISION_KW => "precision",
            SyntaxKind::SCALE_KW => "scale",
            SyntaxKind::IDENTIFIER_KW => "identifier",
            SyntaxKind::PARENT_KW => "parent",
            SyntaxKind::PARENT_ROLE_KW => "parentRole",
            SyntaxKind::PARENT_CARDINALITY_KW => "parentCardinality",
            SyntaxKind::CHILD_KW => "child",
            SyntaxKind::CHILD_ROLE_KW => "childRole",
            SyntaxKind::CHILD_CARDINALITY_KW => "childCardinality",
            SyntaxKind::SOURCES_KW => "sources",
            SyntaxKind::TARGET_KW => "target",
            SyntaxKind::JOIN_KW => "join",
            SyntaxKind::DEPENDENCIES_KW => "dependencies",
            SyntaxKind::CONDITIONS_KW => "conditions",
            SyntaxKind::MAPPINGS_KW => "mappings",
            SyntaxKind::ATTRIBUTE_KW => "attribute",
            SyntaxKind::EXPRESSION_KW => "expression",
            SyntaxKind::NODES_KW => "nodes",
            SyntaxKind::EDGES_KW => "edges",
            SyntaxKind::INHERITANCE_EDGES_KW => "inheritanceEdges",
            SyntaxKind::X_KW => "x",
            SyntaxKind::Y_KW => "y",
            SyntaxKind::WIDTH_KW => "width",
            SyntaxKind::HEIGHT_KW => "height",
            SyntaxKind::SOURCE_NODE_KW => "sourceNode",
            SyntaxKind::TARGET_NODE_KW => "targetNode",
            SyntaxKind::BASE_NODE_KW => "baseNode",
            SyntaxKind::SUPER_NODE_KW => "superNode",
            SyntaxKind::TRUE_KW => "true",
            SyntaxKind::FALSE_KW => "false",
            SyntaxKind::FROM_KW => "from",
            SyntaxKind::INNER_JOIN_KW => "inner-join",
            SyntaxKind::CROSS_JOIN_KW => "cross-join",
            SyntaxKind::LEFT_JOIN_KW => "left-join",
            SyntaxKind::APPLY_KW => "apply",
            SyntaxKind::ZERO_ONE_KW => "zero-one",
            SyntaxKind::ONE_KW => "one",
            SyntaxKind::MULTIPLE_KW => "multiple",
            _ => return None,
        };
        Some(text)
    }
}

//! Logos-based base lexer for CrossModel
//!
//! Produces every token of the source text, trivia included. Indentation
//! tokens are added on top of this stream by [`super::indent`].

use super::syntax_kind::SyntaxKind;
use crate::base::{TextRange, TextSize};
use logos::Logos;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            // A byte order mark is only allowed in front of the document
            Ok(LogosToken::ByteOrderMark) if offset != TextSize::new(0) => SyntaxKind::ERROR,
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec, without indentation tokens
pub fn tokenize_raw(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Whether `text` is exactly one reserved word.
///
/// Every property key, root keyword, join kind and cardinality is reserved;
/// an identifier colliding with one of them is written with a leading `^`.
pub fn is_keyword(text: &str) -> bool {
    let mut lexer = LogosToken::lexer(text);
    let first = matches!(lexer.next(), Some(Ok(token)) if SyntaxKind::from(token).is_keyword());
    first && lexer.next().is_none()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA AND LAYOUT
    // =========================================================================
    #[regex(r"[ \t\r]+")]
    Whitespace,

    #[token("\u{feff}")]
    ByteOrderMark,

    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"\r?\n")]
    Newline,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"\^?[_a-zA-Z][a-zA-Z0-9_\-~$#@/]*")]
    Ident,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("-")]
    Dash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // =========================================================================
    // KEYWORDS - root kinds
    // =========================================================================
    #[token("entity")]
    EntityKw,
    #[token("relationship")]
    RelationshipKw,
    #[token("mapping")]
    MappingKw,
    #[token("systemDiagram")]
    SystemDiagramKw,
    #[token("diagram")]
    DiagramKw,

    // =========================================================================
    // KEYWORDS - property keys
    // =========================================================================
    #[token("id")]
    IdKw,
    #[token("name")]
    NameKw,
    #[token("description")]
    DescriptionKw,
    #[token("inherits")]
    InheritsKw,
    #[token("attributes")]
    AttributesKw,
    #[token("datatype")]
    DatatypeKw,
    #[token("length")]
    LengthKw,
    #[token("precision")]
    PrecisionKw,
    #[token("scale")]
    ScaleKw,
    #[token("identifier")]
    IdentifierKw,
    #[token("parent")]
    ParentKw,
    #[token("parentRole")]
    ParentRoleKw,
    #[token("parentCardinality")]
    ParentCardinalityKw,
    #[token("child")]
    ChildKw,
    #[token("childRole")]
    ChildRoleKw,
    #[token("childCardinality")]
    ChildCardinalityKw,
    #[token("sources")]
    SourcesKw,
    #[token("target")]
    TargetKw,
    #[token("join")]
    JoinKw,
    #[token("dependencies")]
    DependenciesKw,
    #[token("conditions")]
    ConditionsKw,
    #[token("mappings")]
    MappingsKw,
    #[token("attribute")]
    AttributeKw,
    #[token("expression")]
    ExpressionKw,
    #[token("nodes")]
    NodesKw,
    #[token("edges")]
    EdgesKw,
    #[token("inheritanceEdges")]
    InheritanceEdgesKw,
    #[token("x", priority = 3)]
    XKw,
    #[token("y", priority = 3)]
    YKw,
    #[token("width")]
    WidthKw,
    #[token("height")]
    HeightKw,
    #[token("sourceNode")]
    SourceNodeKw,
    #[token("targetNode")]
    TargetNodeKw,
    #[token("baseNode")]
    BaseNodeKw,
    #[token("superNode")]
    SuperNodeKw,

    // =========================================================================
    // KEYWORDS - values
    // =========================================================================
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("from")]
    FromKw,
    #[token("inner-join")]
    InnerJoinKw,
    #[token("cross-join")]
    CrossJoinKw,
    #[token("left-join")]
    LeftJoinKw,
    #[token("apply")]
    ApplyKw,
    #[token("zero-one")]
    ZeroOneKw,
    #[token("one")]
    OneKw,
    #[token("multiple")]
    MultipleKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace | LogosToken::ByteOrderMark => SyntaxKind::WHITESPACE,
            LogosToken::Comment => SyntaxKind::COMMENT,
            LogosToken::Newline => SyntaxKind::NEWLINE,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Dash => SyntaxKind::DASH,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::EntityKw => SyntaxKind::ENTITY_KW,
            LogosToken::RelationshipKw => SyntaxKind::RELATIONSHIP_KW,
            LogosToken::MappingKw => SyntaxKind::MAPPING_KW,
            LogosToken::SystemDiagramKw => SyntaxKind::SYSTEM_DIAGRAM_KW,
            LogosToken::DiagramKw => SyntaxKind::DIAGRAM_KW,
            LogosToken::IdKw => SyntaxKind::ID_KW,
            LogosToken::NameKw => SyntaxKind::NAME_KW,
            LogosToken::DescriptionKw => SyntaxKind::DESCRIPTION_KW,
            LogosToken::InheritsKw => SyntaxKind::INHERITS_KW,
            LogosToken::AttributesKw => SyntaxKind::ATTRIBUTES_KW,
            LogosToken::DatatypeKw => SyntaxKind::DATATYPE_KW,
            LogosToken::LengthKw => SyntaxKind::LENGTH_KW,
            LogosToken::PrecisionKw => SyntaxKind::PRECISION_KW,
            LogosToken::ScaleKw => SyntaxKind::SCALE_KW,
            LogosToken::IdentifierKw => SyntaxKind::IDENTIFIER_KW,
            LogosToken::ParentKw => SyntaxKind::PARENT_KW,
            LogosToken::ParentRoleKw => SyntaxKind::PARENT_ROLE_KW,
            LogosToken::ParentCardinalityKw => SyntaxKind::PARENT_CARDINALITY_KW,
            LogosToken::ChildKw => SyntaxKind::CHILD_KW,
            LogosToken::ChildRoleKw => SyntaxKind::CHILD_ROLE_KW,
            LogosToken::ChildCardinalityKw => SyntaxKind::CHILD_CARDINALITY_KW,
            LogosToken::SourcesKw => SyntaxKind::SOURCES_KW,
            LogosToken::TargetKw => SyntaxKind::TARGET_KW,
            LogosToken::JoinKw => SyntaxKind::JOIN_KW,
            LogosToken::DependenciesKw => SyntaxKind::DEPENDENCIES_KW,
            LogosToken::ConditionsKw => SyntaxKind::CONDITIONS_KW,
            LogosToken::MappingsKw => SyntaxKind::MAPPINGS_KW,
            LogosToken::AttributeKw => SyntaxKind::ATTRIBUTE_KW,
            LogosToken::ExpressionKw => SyntaxKind::EXPRESSION_KW,
            LogosToken::NodesKw => SyntaxKind::NODES_KW,
            LogosToken::EdgesKw => SyntaxKind::EDGES_KW,
            LogosToken::InheritanceEdgesKw => SyntaxKind::INHERITANCE_EDGES_KW,
            LogosToken::XKw => SyntaxKind::X_KW,
            LogosToken::YKw => SyntaxKind::Y_KW,
            LogosToken::WidthKw => SyntaxKind::WIDTH_KW,
            LogosToken::HeightKw => SyntaxKind::HEIGHT_KW,
            LogosToken::SourceNodeKw => SyntaxKind::SOURCE_NODE_KW,
            LogosToken::TargetNodeKw => SyntaxKind::TARGET_NODE_KW,
            LogosToken::BaseNodeKw => SyntaxKind::BASE_NODE_KW,
            LogosToken::SuperNodeKw => SyntaxKind::SUPER_NODE_KW,
            LogosToken::TrueKw => SyntaxKind::TRUE_KW,
            LogosToken::FalseKw => SyntaxKind::FALSE_KW,
            LogosToken::FromKw => SyntaxKind::FROM_KW,
            LogosToken::InnerJoinKw => SyntaxKind::INNER_JOIN_KW,
            LogosToken::CrossJoinKw => SyntaxKind::CROSS_JOIN_KW,
            LogosToken::LeftJoinKw => SyntaxKind::LEFT_JOIN_KW,
            LogosToken::ApplyKw => SyntaxKind::APPLY_KW,
            LogosToken::ZeroOneKw => SyntaxKind::ZERO_ONE_KW,
            LogosToken::OneKw => SyntaxKind::ONE_KW,
            LogosToken::MultipleKw => SyntaxKind::MULTIPLE_KW,
        }
    }
}

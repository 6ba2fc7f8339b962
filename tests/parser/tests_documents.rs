//! Whole-document parser tests.

use rstest::rstest;

use crate::helpers::source_fixtures::*;
use crossmodel::parser::{ErrorCode, JoinKind, Node, NodeKind, Operand, Operator, Parse, parse};
use crossmodel::syntax::{FileType, SyntaxFile};

fn content(parse: &Parse) -> &Node {
    let root = parse.ast.root_content().expect("document should have content");
    parse.ast.node(root)
}

#[rstest]
#[case::person(PERSON, NodeKind::Entity)]
#[case::customer(CUSTOMER, NodeKind::Entity)]
#[case::order(ORDER, NodeKind::Entity)]
#[case::relationship(ORDER_CUSTOMER, NodeKind::Relationship)]
#[case::mapping(CUSTOMER_HISTORY_MAPPING, NodeKind::Mapping)]
#[case::diagram(MAIN_DIAGRAM, NodeKind::SystemDiagram)]
fn test_fixtures_parse_cleanly(#[case] text: &str, #[case] kind: NodeKind) {
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    assert_eq!(content(&parse).kind(), kind);
}

#[rstest]
#[case::by_extension("/ws/Customer.entity.cm", "", FileType::Entity)]
#[case::legacy_diagram("/ws/Main.diagram.cm", "", FileType::SystemDiagram)]
#[case::sniffed("/ws/model.cm", "relationship:\n    id: R\n", FileType::Relationship)]
#[case::sniffed_after_comment("/ws/model.cm", "# header\nmapping:\n    id: M\n", FileType::Mapping)]
#[case::unknown("/ws/model.cm", "", FileType::Generic)]
fn test_file_type_detection(#[case] path: &str, #[case] text: &str, #[case] expected: FileType) {
    assert_eq!(SyntaxFile::new(path, text).file_type(), expected);
}

#[test]
fn test_mapping_structure() {
    let parse = parse(CUSTOMER_HISTORY_MAPPING);
    let Node::Mapping(mapping) = content(&parse) else {
        panic!("expected mapping");
    };
    assert_eq!(mapping.sources.len(), 2);

    let Node::SourceObject(order) = parse.ast.node(mapping.sources[1]) else {
        panic!("expected source object");
    };
    assert_eq!(order.join, Some(JoinKind::LeftJoin));
    assert_eq!(order.dependencies.len(), 1);

    let Node::JoinCondition(condition) = parse.ast.node(order.conditions[0]) else {
        panic!("expected join condition");
    };
    assert_eq!(condition.left.text, "OrderSource.CustomerId");
    assert_eq!(condition.op, Operator::Eq);
    assert!(matches!(&condition.right, Operand::Reference(r) if r.text == "CustomerSource.Id"));
}

#[test]
fn test_condition_with_literal_operand() {
    let text = "\
mapping:
    id: M
    sources:
      - id: A
        entity: Order
        join: from
        conditions:
          - A.Total >= 10
          - A.Status != \"closed\"
";
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::Mapping(mapping) = content(&parse) else {
        panic!("expected mapping");
    };
    let Node::SourceObject(source) = parse.ast.node(mapping.sources[0]) else {
        panic!("expected source object");
    };
    let rights: Vec<&Operand> = source
        .conditions
        .iter()
        .filter_map(|&c| match parse.ast.node(c) {
            Node::JoinCondition(condition) => Some(&condition.right),
            _ => None,
        })
        .collect();
    assert!(matches!(rights[0], Operand::Number(n) if *n == 10.0));
    assert!(matches!(rights[1], Operand::String(s) if s == "closed"));
}

#[test]
fn test_diagram_with_inheritance_edges() {
    let text = "\
systemDiagram:
    id: Main
    nodes:
      - id: PersonNode
        entity: Person
      - id: CustomerNode
        entity: Customer
    inheritanceEdges:
      - id: CustomerPersonEdge
        baseNode: CustomerNode
        superNode: PersonNode
";
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::SystemDiagram(diagram) = content(&parse) else {
        panic!("expected diagram");
    };
    let Node::InheritanceEdge(edge) = parse.ast.node(diagram.inheritance_edges[0]) else {
        panic!("expected inheritance edge");
    };
    assert_eq!(edge.base_node.as_ref().map(|r| r.text.as_str()), Some("CustomerNode"));
    assert_eq!(edge.super_node.as_ref().map(|r| r.text.as_str()), Some("PersonNode"));
}

#[test]
fn test_comments_and_blank_lines_are_ignored() {
    let text = "\
# Customers of the shop
entity:
    id: Customer

    # the primary key
    attributes:
      - id: Id   # numeric
";
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::Entity(entity) = content(&parse) else {
        panic!("expected entity");
    };
    assert_eq!(entity.attributes.len(), 1);
}

#[test]
fn test_escaped_keywords_in_ids_and_references() {
    let text = "entity:\n    id: ^entity\n    inherits:\n      - ^mapping\n";
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::Entity(entity) = content(&parse) else {
        panic!("expected entity");
    };
    assert_eq!(entity.id.as_deref(), Some("entity"));
    assert_eq!(entity.super_entities[0].text, "mapping");
}

#[test]
fn test_errors_in_one_attribute_keep_the_rest() {
    let text = "\
entity:
    id: Customer
    attributes:
      - id: Id
        length: many
      - id: Name
";
    let parse = parse(text);
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0304);
    let Node::Entity(entity) = content(&parse) else {
        panic!("expected entity");
    };
    assert_eq!(entity.attributes.len(), 2);
}

#[test]
fn test_lex_error_leaves_no_content() {
    let parse = parse("entity:\n    id: Customer\n    name: \"open\n");
    assert!(parse.has_lex_error());
    assert!(parse.ast.root_content().is_none());
}

#[test]
fn test_keywords_as_qualified_reference_segments() {
    let text = "\
mapping:
    id: M
    sources:
      - id: A
        entity: Shape
        join: from
        conditions:
          - A.x = A.name
    target:
        entity: Shape
        mappings:
          - attribute: ^width
            sources:
              - A.width
";
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::Mapping(mapping) = content(&parse) else {
        panic!("expected mapping");
    };
    let Node::SourceObject(source) = parse.ast.node(mapping.sources[0]) else {
        panic!("expected source object");
    };
    let Node::JoinCondition(condition) = parse.ast.node(source.conditions[0]) else {
        panic!("expected join condition");
    };
    assert_eq!(condition.left.text, "A.x");
    assert!(matches!(&condition.right, Operand::Reference(r) if r.text == "A.name"));
    let source_ref = parse
        .ast
        .ids()
        .find_map(|n| match parse.ast.node(n) {
            Node::AttributeMappingSource(s) => Some(s.value.text.clone()),
            _ => None,
        });
    assert_eq!(source_ref.as_deref(), Some("A.width"));

    // A bare keyword still needs escaping
    let parse = crossmodel::parse("entity:\n    id: E\n    inherits:\n      - name\n");
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].message, "expected reference, found name");
}

#[test]
fn test_leading_byte_order_mark() {
    let parse = parse("\u{feff}entity:\n    id: Customer\n");
    assert!(parse.ok(), "{:?}", parse.errors);
    let Node::Entity(entity) = content(&parse) else {
        panic!("expected entity");
    };
    assert_eq!(entity.id.as_deref(), Some("Customer"));
    assert_eq!(
        SyntaxFile::new("/ws/model.cm", "\u{feff}mapping:\n    id: M\n").file_type(),
        FileType::Mapping
    );
}

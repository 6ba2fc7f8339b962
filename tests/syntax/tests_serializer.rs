//! Serializer tests over complete documents.

use rstest::rstest;

use crate::helpers::source_fixtures::*;
use crossmodel::ide::to_client_model;
use crossmodel::parser::parse;
use crossmodel::syntax::{SerializerOptions, serialize};

fn reserialize(text: &str) -> String {
    let parse = parse(text);
    assert!(parse.ok(), "{:?}", parse.errors);
    serialize(&parse.ast, &SerializerOptions::default())
}

#[rstest]
#[case::person(PERSON)]
#[case::customer(CUSTOMER)]
#[case::order(ORDER)]
#[case::customer_history(CUSTOMER_HISTORY)]
#[case::relationship(ORDER_CUSTOMER)]
#[case::mapping(CUSTOMER_HISTORY_MAPPING)]
#[case::diagram(MAIN_DIAGRAM)]
fn test_canonical_documents_are_fixed_points(#[case] text: &str) {
    assert_eq!(reserialize(text), text);
}

#[test]
fn test_reordered_document_keeps_its_model() {
    let text = "\
relationship:
    childCardinality: multiple
    attributes:
      - child: Order.CustomerId
        parent: Customer.Id
    child: Order
    parent: Customer
    parentCardinality: one
    id: Order_Customer
";
    let once = reserialize(text);
    assert_eq!(once, ORDER_CUSTOMER);
    assert_eq!(
        to_client_model(&parse(&once).ast),
        to_client_model(&parse(text).ast)
    );
}

#[test]
fn test_wider_layout() {
    let options = SerializerOptions {
        indent_size: 2,
        list_indent: 0,
        ..Default::default()
    };
    let parsed = parse(PERSON);
    let text = serialize(&parsed.ast, &options);

    assert_eq!(
        text,
        "entity:\n  id: Person\n  name: \"Person\"\n  attributes:\n  - id: Name\n    datatype: \"Varchar\"\n"
    );
    let reparsed = parse(&text);
    assert!(reparsed.ok(), "{:?}", reparsed.errors);
    assert_eq!(to_client_model(&reparsed.ast), to_client_model(&parsed.ast));
}

#[test]
fn test_strings_are_escaped() {
    let text = "entity:\n    id: Quote\n    description: \"say \\\"hi\\\"\\nbye\"\n";
    let once = reserialize(text);
    assert_eq!(reserialize(&once), once);
    assert_eq!(
        to_client_model(&parse(&once).ast)["entity"]["description"],
        "say \"hi\"\nbye"
    );
}

#[test]
fn test_keyword_ids_are_escaped_on_output() {
    let text = "entity:\n    id: ^entity\n    inherits:\n      - ^mapping.^id\n";
    assert_eq!(reserialize(text), text);
}

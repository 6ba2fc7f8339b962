//! Validation tests.
//!
//! Each rule is exercised against the `shop` fixtures with one file
//! replaced by a variant that breaks the rule.

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;
use crossmodel::TextSize;
use crossmodel::hir::{Diagnostic, Severity, ValidationOptions, codes};
use crossmodel::ide::AnalysisHost;
use crossmodel::parser::Property;

// =============================================================================
// HELPERS
// =============================================================================

const MAPPING_PATH: &str = "/ws/shop/CustomerHistoryMapping.mapping.cm";
const RELATIONSHIP_PATH: &str = "/ws/shop/Order_Customer.relationship.cm";

/// Diagnostics of `path` in the shop workspace with `path` set to `text`.
fn diagnostics_with(path: &'static str, text: &'static str) -> Vec<Diagnostic> {
    let mut files: Vec<(&str, &str)> = shop_workspace()
        .into_iter()
        .filter(|(p, _)| *p != path)
        .collect();
    files.push((path, text));
    diagnostics_in_workspace(&files, path)
}

fn messages_with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a str> {
    diagnostics
        .iter()
        .filter(|d| d.code() == Some(code))
        .map(|d| d.message.as_ref())
        .collect()
}

// =============================================================================
// REFERENCES AND IDS
// =============================================================================

#[test]
fn test_unresolved_reference_points_at_reference_text() {
    let text = "entity:\n    id: Customer\n    inherits:\n      - Ghost\n";
    let diagnostics = diagnostics_from_source(text, "Customer.entity.cm");

    assert_eq!(codes_of(&diagnostics), vec![codes::UNRESOLVED_REFERENCE]);
    let range = diagnostics[0].range;
    assert_eq!(&text[range], "Ghost");
    assert_eq!(diagnostics[0].property, Some(Property::SuperEntities));
}

#[test]
fn test_duplicate_entity_id_across_files() {
    let host = host_from_sources(&[
        ("/ws/shop/Customer.entity.cm", "entity:\n    id: Customer\n"),
        ("/ws/shop/customer.entity.cm", "entity:\n    id: Customer\n"),
    ]);
    let first = host_file(&host, "/ws/shop/Customer.entity.cm");
    let second = host_file(&host, "/ws/shop/customer.entity.cm");

    assert_eq!(count_code(&diagnostics_of(&host, first), codes::DUPLICATE_ID), 1);
    assert_eq!(count_code(&diagnostics_of(&host, second), codes::DUPLICATE_ID), 1);
}

#[test]
fn test_duplicate_attribute_id_within_entity() {
    let text = "entity:\n    id: Customer\n    attributes:\n      - id: Id\n      - id: Id\n";
    let diagnostics = diagnostics_from_source(text, "Customer.entity.cm");
    assert_eq!(count_code(&diagnostics, codes::DUPLICATE_ID), 2);
}

#[test]
fn test_missing_id() {
    let text = "entity:\n    name: \"Nameless\"\n";
    let diagnostics = diagnostics_from_source(text, "Nameless.entity.cm");
    assert_eq!(codes_of(&diagnostics), vec![codes::MISSING_ID]);
}

#[test]
fn test_duplicate_diagram_node_ids() {
    let text = "\
systemDiagram:
    id: Main
    nodes:
      - id: CustomerNode
        entity: Customer
      - id: CustomerNode
        entity: Customer
    edges:
      - id: CustomerNode
        relationship: Order_Customer
";
    let diagnostics = diagnostics_with("/ws/shop/Main.system-diagram.cm", text);
    assert_eq!(count_code(&diagnostics, codes::DUPLICATE_LOCAL_ID), 2);
}

#[test]
fn test_duplicate_mapping_source_ids() {
    let text = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
      - id: CustomerSource
        entity: Order
        join: left-join
    target:
        entity: CustomerHistory
";
    let diagnostics = diagnostics_with(MAPPING_PATH, text);
    assert_eq!(count_code(&diagnostics, codes::DUPLICATE_LOCAL_ID), 1);
}

// =============================================================================
// INHERITANCE
// =============================================================================

#[test]
fn test_inheritance_cycle_reports_path() {
    let host = host_from_sources(&[
        ("/ws/shop/A.entity.cm", "entity:\n    id: A\n    inherits:\n      - B\n"),
        ("/ws/shop/B.entity.cm", "entity:\n    id: B\n    inherits:\n      - C\n"),
        ("/ws/shop/C.entity.cm", "entity:\n    id: C\n    inherits:\n      - A\n"),
    ]);
    let a = host_file(&host, "/ws/shop/A.entity.cm");
    let diagnostics = diagnostics_of(&host, a);

    assert_eq!(
        messages_with_code(&diagnostics, codes::INHERITANCE_CYCLE),
        vec!["Inheritance cycle detected: A -> B -> C -> A."]
    );
}

#[test]
fn test_self_inheritance_is_a_cycle() {
    let text = "entity:\n    id: A\n    inherits:\n      - A\n";
    let diagnostics = diagnostics_from_source(text, "A.entity.cm");
    assert_eq!(
        messages_with_code(&diagnostics, codes::INHERITANCE_CYCLE),
        vec!["Inheritance cycle detected: A -> A."]
    );
}

#[test]
fn test_unresolved_super_entity_is_not_a_cycle() {
    let text = "entity:\n    id: A\n    inherits:\n      - Missing\n";
    let diagnostics = diagnostics_from_source(text, "A.entity.cm");
    assert_eq!(count_code(&diagnostics, codes::INHERITANCE_CYCLE), 0);
    assert_eq!(count_code(&diagnostics, codes::UNRESOLVED_REFERENCE), 1);
}

#[test]
fn test_diamond_inheritance_is_not_a_cycle() {
    let host = host_from_sources(&[
        ("/ws/shop/Top.entity.cm", "entity:\n    id: Top\n"),
        ("/ws/shop/Left.entity.cm", "entity:\n    id: Left\n    inherits:\n      - Top\n"),
        ("/ws/shop/Right.entity.cm", "entity:\n    id: Right\n    inherits:\n      - Top\n"),
        (
            "/ws/shop/Bottom.entity.cm",
            "entity:\n    id: Bottom\n    inherits:\n      - Left\n      - Right\n",
        ),
    ]);
    let bottom = host_file(&host, "/ws/shop/Bottom.entity.cm");
    assert_no_errors(&diagnostics_of(&host, bottom));
}

// =============================================================================
// RELATIONSHIPS
// =============================================================================

#[test]
fn test_relationship_attribute_referenced_twice() {
    let text = "\
relationship:
    id: Order_Customer
    parent: Customer
    child: Order
    attributes:
      - parent: Customer.Id
        child: Order.CustomerId
      - parent: Customer.Id
        child: Order.Id
";
    let diagnostics = diagnostics_with(RELATIONSHIP_PATH, text);
    assert_eq!(
        messages_with_code(&diagnostics, codes::RELATIONSHIP_ATTRIBUTE_REUSED),
        vec!["Each parent attribute can only be referenced once."]
    );
}

#[test]
fn test_relationship_attribute_of_other_entity() {
    let text = "\
relationship:
    id: Order_Customer
    parent: Customer
    child: Order
    attributes:
      - parent: Order.Id
        child: Order.CustomerId
";
    let diagnostics = diagnostics_with(RELATIONSHIP_PATH, text);
    let foreign: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.code() == Some(codes::FOREIGN_RELATIONSHIP_ATTRIBUTE))
        .collect();
    assert_eq!(foreign.len(), 1);
    assert_eq!(foreign[0].property, Some(Property::Parent));
}

// =============================================================================
// MAPPINGS
// =============================================================================

#[test]
fn test_second_from_source() {
    let text = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
      - id: OrderSource
        entity: Order
        join: from
    target:
        entity: CustomerHistory
";
    let diagnostics = diagnostics_with(MAPPING_PATH, text);
    assert_eq!(codes_of(&diagnostics), vec![codes::MULTIPLE_FROM_SOURCES]);
    assert_eq!(diagnostics[0].property, Some(Property::Join));
}

#[test]
fn test_source_dependency_rules() {
    let text = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
        dependencies:
          - OrderSource
      - id: OrderSource
        entity: Order
        join: left-join
        dependencies:
          - OrderSource
          - CustomerSource
          - CustomerSource
    target:
        entity: CustomerHistory
";
    let diagnostics = diagnostics_with(MAPPING_PATH, text);
    assert_eq!(count_code(&diagnostics, codes::FROM_WITH_DEPENDENCIES), 1);
    assert_eq!(
        messages_with_code(&diagnostics, codes::INVALID_DEPENDENCY),
        vec!["A source object cannot depend on itself."]
    );
    assert_eq!(count_code(&diagnostics, codes::DUPLICATE_DEPENDENCY), 1);

    let duplicate = diagnostics
        .iter()
        .find(|d| d.code() == Some(codes::DUPLICATE_DEPENDENCY))
        .unwrap();
    assert_eq!(duplicate.severity, Severity::Warning);
}

#[test]
fn test_expression_with_undeclared_source() {
    let text = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
    target:
        entity: CustomerHistory
        mappings:
          - attribute: Id
            sources:
              - CustomerSource.Id
            expression: \"{{CustomerSource.Id}} + {{CustomerSource.City}}\"
";
    let diagnostics = diagnostics_with(MAPPING_PATH, text);
    assert_eq!(codes_of(&diagnostics), vec![codes::UNDECLARED_EXPRESSION_SOURCE]);

    let start = text.find("{{CustomerSource.City}}").unwrap();
    let range = diagnostics[0].range;
    assert_eq!(range.start(), TextSize::from(start as u32));
    assert_eq!(&text[range], "{{CustomerSource.City}}");
}

#[test]
fn test_target_attribute_mapped_twice() {
    let text = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
    target:
        entity: CustomerHistory
        mappings:
          - attribute: Id
            sources:
              - CustomerSource.Id
          - attribute: Orders
          - attribute: Id
";
    let diagnostics = diagnostics_with(MAPPING_PATH, text);
    assert_eq!(
        messages_with_code(&diagnostics, codes::TARGET_ATTRIBUTE_REMAPPED),
        vec!["Target attribute 'Id' is already mapped."]
    );
}

// =============================================================================
// FILE NAMES
// =============================================================================

#[test]
fn test_filename_mismatch_is_a_warning() {
    let diagnostics = diagnostics_from_source(PERSON, "People.entity.cm");
    assert_eq!(codes_of(&diagnostics), vec![codes::FILENAME_MISMATCH]);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_filename_match_ignores_case() {
    let diagnostics = diagnostics_from_source(PERSON, "person.entity.cm");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_filename_convention_can_be_disabled() {
    let host = AnalysisHost::with_options(ValidationOptions {
        filename_convention: false,
    });
    host.register_package(shop_package());
    let file = host.set_file_content("/ws/shop/People.entity.cm", PERSON);
    assert!(diagnostics_of(&host, file).is_empty());
}

#[test]
fn test_diagram_without_id_has_no_filename_warning() {
    let text = "systemDiagram:\n    name: \"Unnamed\"\n";
    let diagnostics = diagnostics_from_source(text, "Overview.system-diagram.cm");
    assert_eq!(count_code(&diagnostics, codes::FILENAME_MISMATCH), 0);
}

// =============================================================================
// SYNTAX
// =============================================================================

#[test]
fn test_syntax_errors_become_diagnostics() {
    let text = "entity:\n    id: Customer\n    colour: \"red\"\n";
    let diagnostics = diagnostics_from_source(text, "Customer.entity.cm");
    assert_eq!(codes_of(&diagnostics), vec!["E0302"]);
}

#[test]
fn test_indentation_error_stops_the_document() {
    let text = "entity:\n    id: Customer\n  name: \"C\"\n";
    let diagnostics = diagnostics_from_source(text, "Customer.entity.cm");
    assert_eq!(codes_of(&diagnostics), vec!["E0105"]);
}

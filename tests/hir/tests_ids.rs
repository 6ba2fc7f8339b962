//! Id allocation tests.

use rstest::rstest;

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;
use crossmodel::hir::{compute_local_ids, next_free_id};
use crossmodel::parser::{NodeKind, parse};

fn diagram_with_nodes(ids: &[&str]) -> String {
    let mut text = String::from("systemDiagram:\n    id: Main\n");
    if !ids.is_empty() {
        text.push_str("    nodes:\n");
        for id in ids {
            text.push_str(&format!("      - id: {id}\n        entity: Customer\n"));
        }
    }
    text
}

#[rstest]
#[case::empty_diagram(&[], "nodeA")]
#[case::one_taken(&["nodeA"], "nodeA1")]
#[case::two_taken(&["nodeA", "nodeA1"], "nodeA2")]
fn test_unique_node_naming(#[case] existing: &[&str], #[case] expected: &str) {
    let (host, file) = host_from_source(&diagram_with_nodes(existing), "Main.system-diagram.cm");
    let analysis = host.analysis();
    let diagram = analysis.document(file).unwrap().ast().root_content().unwrap();

    let proposed = analysis
        .propose_node_id(file, diagram, NodeKind::EntityNode, "nodeA")
        .unwrap();
    assert_eq!(proposed, expected);
}

#[test]
fn test_next_free_id_picks_smallest_gap() {
    let taken = ["A", "A1", "A2", "A4"];
    assert_eq!(next_free_id("A", |id| taken.contains(&id)), "A3");
    assert_eq!(next_free_id("B", |id| taken.contains(&id)), "B");
}

#[test]
fn test_node_ids_of_other_kinds_do_not_collide() {
    let text = "\
systemDiagram:
    id: Main
    nodes:
      - id: Edge
        entity: Customer
";
    let (host, file) = host_from_source(text, "Main.system-diagram.cm");
    let analysis = host.analysis();
    let diagram = analysis.document(file).unwrap().ast().root_content().unwrap();

    assert_eq!(
        analysis
            .propose_node_id(file, diagram, NodeKind::RelationshipEdge, "Edge")
            .unwrap(),
        "Edge"
    );
}

#[test]
fn test_global_id_proposal_skips_existing_entities() {
    let host = host_from_sources(&shop_workspace());
    let customer = host_file(&host, "/ws/shop/Customer.entity.cm");
    let analysis = host.analysis();

    assert_eq!(analysis.propose_global_id(NodeKind::Entity, "Customer", None), "Customer1");
    assert_eq!(analysis.propose_global_id(NodeKind::Entity, "Invoice", None), "Invoice");
    assert_eq!(
        analysis.propose_global_id(NodeKind::Entity, "Customer", Some(customer)),
        "Customer"
    );
}

#[test]
fn test_local_ids_are_owner_qualified() {
    let ast = parse(CUSTOMER_HISTORY_MAPPING).ast;
    let ids = compute_local_ids(&ast);
    let mut values: Vec<&str> = ids.values().map(|id| id.as_str()).collect();
    values.sort_unstable();

    assert_eq!(
        values,
        vec![
            "CustomerHistoryMapping",
            "CustomerHistoryMapping.CustomerSource",
            "CustomerHistoryMapping.OrderSource",
        ]
    );
}

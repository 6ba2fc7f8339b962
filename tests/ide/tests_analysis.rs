//! AnalysisHost tests: change handling, snapshots and payloads.

use std::path::Path;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;
use crossmodel::TextSize;
use crossmodel::hir::{BuildOutcome, DocumentState, codes};
use crossmodel::ide::AnalysisHost;
use crossmodel::syntax::SerializerOptions;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const MAPPING_PATH: &str = "/ws/shop/CustomerHistoryMapping.mapping.cm";

// =============================================================================
// CHANGES
// =============================================================================

#[test]
fn test_edits_are_picked_up_by_the_next_snapshot() {
    let (host, file) = host_from_source("entity:\n    id: Customer\n    inherits:\n      - Person\n", "Customer.entity.cm");
    assert_eq!(
        count_code(&diagnostics_of(&host, file), codes::UNRESOLVED_REFERENCE),
        1
    );

    host.set_file_content("/ws/shop/Person.entity.cm", PERSON);
    assert_no_errors(&diagnostics_of(&host, file));
}

#[test]
fn test_replacing_a_file_keeps_its_id() {
    let (host, file) = host_from_source(PERSON, "Person.entity.cm");
    let again = host.set_file_content("/ws/shop/Person.entity.cm", "entity:\n    id: Person\n");

    assert_eq!(file, again);
    assert_eq!(host.file_count(), 1);
}

#[test]
fn test_remove_file() {
    let (host, _) = host_from_source(PERSON, "Person.entity.cm");
    let path = Path::new("/ws/shop/Person.entity.cm");

    assert!(host.has_file(path));
    assert!(host.remove_file(path));
    assert!(!host.remove_file(path));
    assert_eq!(host.file_count(), 0);
}

#[test]
fn test_second_build_has_nothing_to_do() {
    let host = host_from_sources(&shop_workspace());
    let cancel = CancellationToken::new();

    assert_eq!(
        host.build(&cancel),
        BuildOutcome::Completed { documents: 7 }
    );
    assert_eq!(host.build(&cancel), BuildOutcome::Completed { documents: 0 });
}

#[test]
fn test_snapshot_documents_are_validated() {
    let host = host_from_sources(&shop_workspace());
    let analysis = host.analysis();
    assert!(
        analysis
            .workspace()
            .documents()
            .all(|d| d.state == DocumentState::Validated)
    );
}

#[test]
fn test_all_diagnostics_carry_paths() {
    let host = host_from_sources(&[("/ws/shop/Wrong.entity.cm", PERSON)]);
    let analysis = host.analysis();
    let all = analysis.all_diagnostics();

    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, Path::new("/ws/shop/Wrong.entity.cm"));
    assert_eq!(all[0].1.code(), Some(codes::FILENAME_MISMATCH));
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[test]
fn test_mapping_client_model() {
    let host = host_from_sources(&shop_workspace());
    let file = host_file(&host, MAPPING_PATH);
    let analysis = host.analysis();
    let model = analysis.client_model(file).unwrap();

    let mapping = &model["mapping"];
    assert_eq!(model["$type"], "CrossModelRoot");
    assert_eq!(mapping["$type"], "Mapping");
    assert_eq!(mapping["sources"][0]["join"], "from");
    assert_eq!(mapping["sources"][1]["entity"], "Order");
    assert_eq!(
        mapping["sources"][1]["dependencies"][0],
        json!({ "$type": "SourceObjectDependency", "value": "CustomerSource" })
    );
    assert_eq!(mapping["target"]["entity"], "CustomerHistory");
    assert_eq!(mapping["target"]["mappings"][0]["attribute"]["value"], "Id");
    assert_eq!(
        mapping["target"]["mappings"][0]["expression"],
        "{{CustomerSource.Id}}"
    );
}

#[test]
fn test_serialize_through_snapshot() {
    let host = host_from_sources(&shop_workspace());
    let file = host_file(&host, MAPPING_PATH);
    let analysis = host.analysis();

    let text = analysis
        .serialize(file, &SerializerOptions::default())
        .unwrap();
    assert_eq!(text, CUSTOMER_HISTORY_MAPPING);
}

#[test]
fn test_unknown_file_has_no_payload() {
    let host = AnalysisHost::new();
    let other = host_from_sources(&[("/ws/shop/Person.entity.cm", PERSON)]);
    let file = host_file(&other, "/ws/shop/Person.entity.cm");

    let analysis = host.analysis();
    assert!(analysis.client_model(file).is_none());
    assert!(analysis.diagnostics(file).is_empty());
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[test]
fn test_goto_definition_of_target_attribute_reaches_entity() {
    let host = host_from_sources(&shop_workspace());
    let mapping = host_file(&host, MAPPING_PATH);
    let history = host_file(&host, "/ws/shop/CustomerHistory.entity.cm");
    let analysis = host.analysis();

    let offset = CUSTOMER_HISTORY_MAPPING.find("attribute: Id").unwrap() + "attribute: ".len();
    let (file, range) = analysis
        .goto_definition(mapping, TextSize::from(offset as u32))
        .unwrap();

    let declared = CUSTOMER_HISTORY.find("id: Id").unwrap() + "id: ".len();
    assert_eq!(file, history);
    assert!(range.contains(TextSize::from(declared as u32)));
}

#[test]
fn test_goto_definition_off_reference_is_none() {
    let host = host_from_sources(&shop_workspace());
    let mapping = host_file(&host, MAPPING_PATH);
    let analysis = host.analysis();

    assert!(analysis.goto_definition(mapping, TextSize::from(0)).is_none());
}

//! Resolution tests: local, project and dependency scopes.

use std::path::Path;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;
use crossmodel::hir::{Linked, NodeRef, codes};
use crossmodel::ide::AnalysisHost;
use crossmodel::parser::{NodeKind, Property};
use crossmodel::project::{PackageInfo, PackageRegistry};

// =============================================================================
// HELPERS
// =============================================================================

fn package(name: &str, directory: &str, dependencies: &[&str]) -> PackageInfo {
    PackageInfo::new(
        name,
        None,
        directory,
        dependencies.iter().map(|d| d.to_string()).collect(),
    )
}

/// Texts and targets of every link in `path`.
fn links_of(host: &AnalysisHost, path: &str) -> Vec<(String, bool)> {
    let analysis = host.analysis();
    let document = analysis.workspace().document_by_path(Path::new(path)).unwrap();
    document
        .links
        .iter()
        .map(|(_, link)| (link.text().to_string(), link.is_resolved()))
        .collect()
}

// =============================================================================
// PROJECT SCOPE
// =============================================================================

#[test]
fn test_shop_workspace_resolves_everything() {
    let host = host_from_sources(&shop_workspace());
    let analysis = host.analysis();
    let problems = analysis.all_diagnostics();
    assert!(
        problems.is_empty(),
        "Expected a clean workspace, got:\n{}",
        problems
            .iter()
            .map(|(path, d)| format!("  {}: {:?} {}", path.display(), d.code(), d.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_relationship_links_to_entity_attributes() {
    let host = host_from_sources(&shop_workspace());
    let links = links_of(&host, "/ws/shop/Order_Customer.relationship.cm");
    assert_eq!(
        links,
        vec![
            ("Customer".to_string(), true),
            ("Order".to_string(), true),
            ("Customer.Id".to_string(), true),
            ("Order.CustomerId".to_string(), true),
        ]
    );
}

#[test]
fn test_unknown_package_sees_only_its_own_document() {
    let host = AnalysisHost::new();
    host.set_file_content("/loose/Person.entity.cm", PERSON);
    let customer = host.set_file_content("/loose/Customer.entity.cm", CUSTOMER);

    let diagnostics = diagnostics_of(&host, customer);
    assert_eq!(codes_of(&diagnostics), vec![codes::UNRESOLVED_REFERENCE]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Could not resolve reference to LogicalEntity named 'Person'."
    );
}

// =============================================================================
// DEPENDENCY SCOPE
// =============================================================================

const BASE: &str = "entity:\n    id: Base\n    attributes:\n      - id: Key\n";
const DERIVED: &str = "entity:\n    id: Derived\n    inherits:\n      - lib.Base\n";

#[test]
fn test_dependency_exports_resolve_by_global_id() {
    let host = AnalysisHost::new();
    host.register_package(package("lib", "/ws/lib", &[]));
    host.register_package(package("app", "/ws/app", &["lib"]));
    host.set_file_content("/ws/lib/Base.entity.cm", BASE);
    let derived = host.set_file_content("/ws/app/Derived.entity.cm", DERIVED);

    assert_no_errors(&diagnostics_of(&host, derived));
}

#[test]
fn test_undeclared_dependency_is_not_visible() {
    let host = AnalysisHost::new();
    host.register_package(package("lib", "/ws/lib", &[]));
    host.register_package(package("app", "/ws/app", &[]));
    host.set_file_content("/ws/lib/Base.entity.cm", BASE);
    let derived = host.set_file_content("/ws/app/Derived.entity.cm", DERIVED);

    assert_eq!(
        count_code(&diagnostics_of(&host, derived), codes::UNRESOLVED_REFERENCE),
        1
    );
}

#[test]
fn test_package_local_names_do_not_cross_packages() {
    let host = AnalysisHost::new();
    host.register_package(package("lib", "/ws/lib", &[]));
    host.register_package(package("app", "/ws/app", &["lib"]));
    host.set_file_content("/ws/lib/Base.entity.cm", BASE);
    let text = "entity:\n    id: Derived\n    inherits:\n      - Base\n";
    let derived = host.set_file_content("/ws/app/Derived.entity.cm", text);

    assert_eq!(
        count_code(&diagnostics_of(&host, derived), codes::UNRESOLVED_REFERENCE),
        1
    );
}

#[test]
fn test_registering_a_package_relinks_documents() {
    let host = AnalysisHost::new();
    host.set_file_content("/ws/lib/Base.entity.cm", BASE);
    let derived = host.set_file_content("/ws/app/Derived.entity.cm", DERIVED);
    assert_eq!(
        count_code(&diagnostics_of(&host, derived), codes::UNRESOLVED_REFERENCE),
        1
    );

    host.register_package(package("lib", "/ws/lib", &[]));
    host.register_package(package("app", "/ws/app", &["lib"]));
    assert_no_errors(&diagnostics_of(&host, derived));
}

#[test]
fn test_package_cycle_visibility_terminates() {
    let mut registry = PackageRegistry::new();
    registry.register(package("P1", "/ws/p1", &["P2"]));
    registry.register(package("P2", "/ws/p2", &["P3"]));
    registry.register(package("P3", "/ws/p3", &["P1"]));

    let visible: Vec<String> = registry
        .visible_packages("P1")
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(visible, vec!["P1", "P2", "P3"]);
}

// =============================================================================
// DERIVED ATTRIBUTES
// =============================================================================

#[test]
fn test_source_objects_see_inherited_attributes() {
    let host = host_from_sources(&shop_workspace());
    let mapping = host_file(&host, "/ws/shop/CustomerHistoryMapping.mapping.cm");
    let analysis = host.analysis();
    let ast = analysis.document(mapping).unwrap().ast();
    let source = ast
        .ids()
        .find(|&n| ast.kind(n) == NodeKind::AttributeMappingSource)
        .unwrap();

    let candidates = analysis.reference_candidates(mapping, source, Property::Value);
    for expected in ["CustomerSource.Id", "CustomerSource.City", "CustomerSource.Name", "OrderSource.CustomerId"] {
        assert!(
            candidates.iter().any(|c| c == expected),
            "missing {expected} in {candidates:?}"
        );
    }
}

#[test]
fn test_target_attributes_use_bare_ids() {
    let host = host_from_sources(&shop_workspace());
    let mapping = host_file(&host, "/ws/shop/CustomerHistoryMapping.mapping.cm");
    let analysis = host.analysis();
    let document = analysis.document(mapping).unwrap();
    let ast = document.ast();
    let target = ast
        .ids()
        .find(|&n| ast.kind(n) == NodeKind::AttributeMappingTarget)
        .unwrap();

    let candidates = analysis.reference_candidates(mapping, target, Property::Value);
    // Only the clones of the mapping's own target object
    assert_eq!(candidates, ["Id", "Orders"]);

    let link = document.links.iter().find(|(site, _)| site.node == target).unwrap().1;
    let Linked::Resolved { target, kind, .. } = link else {
        panic!("target attribute should resolve");
    };
    assert_eq!(*kind, NodeKind::TargetObjectAttribute);
    assert!(matches!(target.node, NodeRef::Derived(_)));
}

fn target_mapping(id: &str, entity: &str) -> String {
    format!(
        "mapping:\n    id: {id}\n    sources:\n      - id: Src\n        entity: {entity}\n        join: from\n    target:\n        entity: {entity}\n        mappings:\n          - attribute: Id\n"
    )
}

#[test]
fn test_target_attribute_ignores_other_mappings() {
    let first = target_mapping("FirstMapping", "First");
    let second = target_mapping("SecondMapping", "Second");
    let host = host_from_sources(&[
        ("/ws/shop/First.entity.cm", "entity:\n    id: First\n    attributes:\n      - id: Id\n"),
        ("/ws/shop/Second.entity.cm", "entity:\n    id: Second\n    attributes:\n      - id: Other\n"),
        ("/ws/shop/FirstMapping.mapping.cm", first.as_str()),
        ("/ws/shop/SecondMapping.mapping.cm", second.as_str()),
    ]);
    let first_file = host_file(&host, "/ws/shop/FirstMapping.mapping.cm");
    let second_file = host_file(&host, "/ws/shop/SecondMapping.mapping.cm");

    // `Id` is exported by FirstMapping's target but Second has no such attribute
    let diagnostics = diagnostics_of(&host, second_file);
    assert_eq!(count_code(&diagnostics, codes::UNRESOLVED_REFERENCE), 1);
    assert_no_errors(&diagnostics_of(&host, first_file));

    let analysis = host.analysis();
    let document = analysis.document(first_file).unwrap();
    let ast = document.ast();
    let target = ast
        .ids()
        .find(|&n| ast.kind(n) == NodeKind::AttributeMappingTarget)
        .unwrap();
    let link = document.links.iter().find(|(site, _)| site.node == target).unwrap().1;
    let Linked::Resolved { target, .. } = link else {
        panic!("target attribute should resolve");
    };
    assert_eq!(target.file, first_file);
    assert!(matches!(target.node, NodeRef::Derived(_)));
}

#[test]
fn test_diagram_nodes_are_not_exported() {
    let host = host_from_sources(&shop_workspace());
    let analysis = host.analysis();
    let index = analysis.workspace().index();

    assert!(index.lookup("Main").iter().any(|d| d.kind == NodeKind::SystemDiagram));
    assert!(index.lookup("Main.CustomerNode").is_empty());
    assert!(index.lookup("shop.Main.CustomerNode").is_empty());
}

#[test]
fn test_removing_a_file_unresolves_its_dependents() {
    let host = host_from_sources(&shop_workspace());
    let relationship = host_file(&host, "/ws/shop/Order_Customer.relationship.cm");
    assert_no_errors(&diagnostics_of(&host, relationship));

    host.remove_file(Path::new("/ws/shop/Order.entity.cm"));
    let diagnostics = diagnostics_of(&host, relationship);
    assert_eq!(count_code(&diagnostics, codes::UNRESOLVED_REFERENCE), 2);
}

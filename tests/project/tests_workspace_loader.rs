//! Loading workspace folders from disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::source_fixtures::*;
use crossmodel::hir::{Diagnostic, codes};
use crossmodel::ide::AnalysisHost;
use crossmodel::project::{LoadSummary, ProjectError, WorkspaceLoader};

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn all_diagnostics(host: &AnalysisHost) -> Vec<Diagnostic> {
    host.analysis()
        .all_diagnostics()
        .into_iter()
        .map(|(_, diagnostic)| diagnostic)
        .collect()
}

/// `lib` holds `Base`; `app` depends on `lib` and inherits from it.
fn two_package_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "lib/package.json",
        r#"{ "name": "lib", "version": "1.0.0" }"#,
    );
    write(
        temp.path(),
        "lib/Base.entity.cm",
        "entity:\n    id: Base\n    attributes:\n      - id: Key\n",
    );
    write(
        temp.path(),
        "app/package.json",
        r#"{ "name": "app", "version": "0.1.0", "dependencies": { "lib": "^1.0.0" } }"#,
    );
    write(
        temp.path(),
        "app/Derived.entity.cm",
        "entity:\n    id: Derived\n    inherits:\n      - lib.Base\n",
    );
    temp
}

#[test]
fn test_load_two_packages() {
    let temp = two_package_workspace();
    let host = AnalysisHost::new();

    let summary = WorkspaceLoader::new()
        .load_directory_into_host(temp.path(), &host)
        .unwrap();
    assert_eq!(
        summary,
        LoadSummary {
            packages: 2,
            files: 2,
            skipped: 0,
        }
    );

    let analysis = host.analysis();
    let problems = analysis.all_diagnostics();
    assert!(problems.is_empty(), "{problems:?}");

    let derived = analysis.file_id(&temp.path().join("app/Derived.entity.cm")).unwrap();
    let document = analysis.document(derived).unwrap();
    assert_eq!(document.package_id, "app@0.1.0");
    assert_eq!(document.package_reference, "app");
}

#[test]
fn test_dependency_must_be_declared() {
    let temp = two_package_workspace();
    write(temp.path(), "app/package.json", r#"{ "name": "app" }"#);
    let host = AnalysisHost::new();
    WorkspaceLoader::new()
        .load_directory_into_host(temp.path(), &host)
        .unwrap();

    let analysis = host.analysis();
    let derived = analysis.file_id(&temp.path().join("app/Derived.entity.cm")).unwrap();
    let diagnostics = analysis.diagnostics(derived).to_vec();
    assert_eq!(codes_of(&diagnostics), vec![codes::UNRESOLVED_REFERENCE]);
}

#[test]
fn test_files_outside_packages_still_load() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "loose/Person.entity.cm", PERSON);
    let host = AnalysisHost::new();

    let summary = WorkspaceLoader::new()
        .load_directory_into_host(temp.path(), &host)
        .unwrap();
    assert_eq!(summary.packages, 0);
    assert_eq!(summary.files, 1);

    let analysis = host.analysis();
    let person = analysis.file_id(&temp.path().join("loose/Person.entity.cm")).unwrap();
    assert!(analysis.diagnostics(person).is_empty());
}

#[test]
fn test_hidden_directories_are_skipped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "package.json", r#"{ "name": "shop" }"#);
    write(temp.path(), "Person.entity.cm", PERSON);
    write(temp.path(), ".history/Person.entity.cm", PERSON);

    let files = WorkspaceLoader::new().scan(temp.path()).unwrap();
    assert_eq!(files.models, vec![temp.path().join("Person.entity.cm")]);
}

#[test]
fn test_load_single_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "package.json", r#"{ "name": "shop" }"#);
    write(temp.path(), "Customer.entity.cm", CUSTOMER);
    let host = AnalysisHost::new();
    let loader = WorkspaceLoader::new();
    loader
        .load_directory_into_host(temp.path(), &host)
        .unwrap();
    assert_eq!(count_code(&all_diagnostics(&host), codes::UNRESOLVED_REFERENCE), 1);

    let person = temp.path().join("Person.entity.cm");
    fs::write(&person, PERSON).unwrap();
    loader.load_file_into_host(&person, &host).unwrap();

    assert!(all_diagnostics(&host).is_empty());
}

#[test]
fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let host = AnalysisHost::new();
    let result = WorkspaceLoader::new().load_file_into_host(temp.path().join("Nope.entity.cm"), &host);

    assert!(matches!(result, Err(ProjectError::Io { .. })));
    assert_eq!(host.file_count(), 0);
}

//! Diagnostic assertion helpers.

use crossmodel::FileId;
use crossmodel::hir::{Diagnostic, Severity};
use crossmodel::ide::AnalysisHost;

use crate::helpers::host_helpers::{host_file, host_from_source, host_from_sources};

/// Diagnostics of one file of a freshly built host.
pub fn diagnostics_of(host: &AnalysisHost, file: FileId) -> Vec<Diagnostic> {
    host.analysis().diagnostics(file).to_vec()
}

/// Diagnostics of `source` as the only file of the `shop` package.
pub fn diagnostics_from_source(source: &str, filename: &str) -> Vec<Diagnostic> {
    let (host, file) = host_from_source(source, filename);
    diagnostics_of(&host, file)
}

/// Diagnostics of `path` after building all `files`.
pub fn diagnostics_in_workspace(files: &[(&str, &str)], path: &str) -> Vec<Diagnostic> {
    let host = host_from_sources(files);
    let file = host_file(&host, path);
    diagnostics_of(&host, file)
}

/// Codes of the given diagnostics, in order.
pub fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().filter_map(Diagnostic::code).collect()
}

pub fn count_code(diagnostics: &[Diagnostic], code: &str) -> usize {
    diagnostics.iter().filter(|d| d.code() == Some(code)).count()
}

pub fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

/// Assert a diagnostic list holds no errors.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors = errors(diagnostics);
    assert!(
        errors.is_empty(),
        "Expected no errors, got {} error(s):\n{}",
        errors.len(),
        errors
            .iter()
            .map(|e| format!("  {:?} {}: {}", e.range, e.code().unwrap_or("-"), e.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use super::error::ProjectError;
use super::packages::is_package_descriptor;
use crate::ide::AnalysisHost;
use crate::syntax::{SyntaxFile, is_cm_file};

/// What a directory scan turned up.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkspaceFiles {
    pub descriptors: Vec<PathBuf>,
    pub models: Vec<PathBuf>,
}

/// Summary of a load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub packages: usize,
    pub files: usize,
    /// Files or descriptors that could not be read; logged, not fatal.
    pub skipped: usize,
}

/// Loads workspace folders into an [`AnalysisHost`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Collect package descriptors and model files below `root`, sorted.
    ///
    /// `node_modules` and hidden directories are not entered.
    pub fn scan(&self, root: &Path) -> Result<WorkspaceFiles, ProjectError> {
        if !root.is_dir() {
            return Err(ProjectError::DirectoryNotFound(root.to_path_buf()));
        }
        let mut files = WorkspaceFiles::default();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry.map_err(|e| ProjectError::Walk {
                path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if is_package_descriptor(&path) {
                files.descriptors.push(path);
            } else if is_cm_file(&path.to_string_lossy()) {
                files.models.push(path);
            }
        }
        Ok(files)
    }

    /// Register every package and add every model file below `root`.
    ///
    /// Unreadable descriptors and files are skipped with a warning. Nothing
    /// is built; call [`AnalysisHost::build`] or [`AnalysisHost::analysis`].
    pub fn load_directory_into_host(
        &self,
        root: impl AsRef<Path>,
        host: &AnalysisHost,
    ) -> Result<LoadSummary, ProjectError> {
        let root = root.as_ref();
        let files = self.scan(root)?;
        let mut summary = LoadSummary::default();

        for descriptor in &files.descriptors {
            match host.load_package(descriptor) {
                Ok(_) => summary.packages += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping package descriptor");
                    summary.skipped += 1;
                }
            }
        }

        // Parsing is independent per file
        let parsed: Vec<(PathBuf, Result<(Arc<str>, SyntaxFile), ProjectError>)> = files
            .models
            .into_par_iter()
            .map(|path| {
                let result = load_and_parse(&path);
                (path, result)
            })
            .collect();

        for (path, result) in parsed {
            match result {
                Ok((text, file)) => {
                    host.set_file(path, text, file);
                    summary.files += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping model file");
                    summary.skipped += 1;
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            packages = summary.packages,
            files = summary.files,
            skipped = summary.skipped,
            "loaded workspace folder"
        );
        Ok(summary)
    }

    /// Read, parse and add a single model file.
    pub fn load_file_into_host(&self, path: impl Into<PathBuf>, host: &AnalysisHost) -> Result<(), ProjectError> {
        let path = path.into();
        let (text, file) = load_and_parse(&path)?;
        host.set_file(path, text, file);
        Ok(())
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

/// Read and parse one model file.
pub fn load_and_parse(path: &Path) -> Result<(Arc<str>, SyntaxFile), ProjectError> {
    let text = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
    let file = SyntaxFile::new(&path.to_string_lossy(), &text);
    Ok((Arc::from(text), file))
}

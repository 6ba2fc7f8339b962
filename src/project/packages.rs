//! Package registry.
//!
//! A package is a directory holding a `package.json`. Every model file
//! belongs to the package with the deepest directory containing it, or to
//! the `unknown` sentinel when no package contains it.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use smol_str::SmolStr;

use super::error::ProjectError;
use crate::base::constants::{PACKAGE_DESCRIPTOR, UNKNOWN_PACKAGE_ID, UNKNOWN_PACKAGE_REFERENCE};
use crate::syntax::to_id;

/// The subset of `package.json` the model cares about.
#[derive(Debug, Clone, Deserialize)]
struct PackageDescriptor {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
}

/// A registered package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// `name@version`, or `name` when the descriptor has no version.
    pub id: SmolStr,
    /// Name other packages use to qualify references into this one.
    pub reference: SmolStr,
    pub name: String,
    pub version: Option<String>,
    /// Directory holding the descriptor.
    pub directory: PathBuf,
    /// Names of the declared dependencies.
    pub dependencies: Vec<String>,
}

impl PackageInfo {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        directory: impl Into<PathBuf>,
        dependencies: Vec<String>,
    ) -> Self {
        let name = name.into();
        let id = match &version {
            Some(version) => SmolStr::from(format!("{name}@{version}")),
            None => SmolStr::from(name.as_str()),
        };
        Self {
            id,
            reference: to_id(&name).into(),
            name,
            version,
            directory: directory.into(),
            dependencies,
        }
    }

    /// Parse a `package.json` located in `directory`.
    pub fn from_descriptor(directory: impl Into<PathBuf>, text: &str) -> Result<Self, serde_json::Error> {
        let descriptor: PackageDescriptor = serde_json::from_str(text)?;
        Ok(Self::new(
            descriptor.name,
            descriptor.version,
            directory,
            descriptor.dependencies.into_keys().collect(),
        ))
    }
}

/// All packages of the workspace, keyed by package id.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: IndexMap<SmolStr, PackageInfo>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, replacing any package with the same directory.
    pub fn register(&mut self, info: PackageInfo) -> SmolStr {
        self.packages.retain(|_, p| p.directory != info.directory);
        if self.by_name(&info.name).is_some() {
            tracing::warn!(
                name = %info.name,
                directory = %info.directory.display(),
                "duplicate package name, dependencies resolve to the first registration"
            );
        }
        let id = info.id.clone();
        tracing::debug!(package = %id, directory = %info.directory.display(), "registered package");
        self.packages.insert(id.clone(), info);
        id
    }

    /// Read and register the `package.json` at `descriptor`.
    pub fn load_descriptor(&mut self, descriptor: &Path) -> Result<SmolStr, ProjectError> {
        let text = std::fs::read_to_string(descriptor).map_err(|e| ProjectError::io(descriptor, e))?;
        let directory = descriptor.parent().unwrap_or(Path::new("")).to_path_buf();
        let info = PackageInfo::from_descriptor(directory, &text).map_err(|source| ProjectError::Json {
            path: descriptor.to_path_buf(),
            source,
        })?;
        Ok(self.register(info))
    }

    /// Drop the package rooted at `directory`.
    pub fn remove_directory(&mut self, directory: &Path) -> Option<PackageInfo> {
        let id = self
            .packages
            .iter()
            .find(|(_, p)| p.directory == directory)
            .map(|(id, _)| id.clone())?;
        self.packages.shift_remove(&id)
    }

    pub fn get(&self, id: &str) -> Option<&PackageInfo> {
        self.packages.get(id)
    }

    /// First registered package called `name`.
    pub fn by_name(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.values().find(|p| p.name == name)
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The package with the deepest directory containing `path`.
    pub fn package_of(&self, path: &Path) -> Option<&PackageInfo> {
        self.packages
            .values()
            .filter(|p| path.starts_with(&p.directory))
            .max_by_key(|p| p.directory.components().count())
    }

    /// Package id of `path`, or the unknown sentinel.
    pub fn package_id_of(&self, path: &Path) -> SmolStr {
        self.package_of(path)
            .map_or_else(|| SmolStr::new_static(UNKNOWN_PACKAGE_ID), |p| p.id.clone())
    }

    /// Package reference name of `path`, or the unknown sentinel.
    pub fn package_reference_of(&self, path: &Path) -> SmolStr {
        self.package_of(path).map_or_else(
            || SmolStr::new_static(UNKNOWN_PACKAGE_REFERENCE),
            |p| p.reference.clone(),
        )
    }

    /// Ids of the packages whose exports `id` can see: itself plus the
    /// transitive closure of its dependencies. Dependency cycles are
    /// tolerated; the unknown sentinel sees nothing.
    pub fn visible_packages(&self, id: &str) -> IndexSet<SmolStr> {
        let mut visited = IndexSet::new();
        if id == UNKNOWN_PACKAGE_ID {
            return visited;
        }
        if let Some(package) = self.get(id) {
            self.visit(package, &mut visited);
        }
        visited
    }

    fn visit(&self, package: &PackageInfo, visited: &mut IndexSet<SmolStr>) {
        if !visited.insert(package.id.clone()) {
            return;
        }
        for dependency in &package.dependencies {
            match self.by_name(dependency) {
                Some(next) => self.visit(next, visited),
                None => tracing::trace!(package = %package.id, dependency, "dependency not in workspace"),
            }
        }
    }

    /// Whether `from` can see the exports of `to`.
    pub fn is_visible(&self, from: &str, to: &str) -> bool {
        to != UNKNOWN_PACKAGE_ID && self.visible_packages(from).contains(to)
    }

    /// Reference names of the packages visible from `id`.
    pub fn visible_references(&self, id: &str) -> IndexSet<SmolStr> {
        self.visible_packages(id)
            .iter()
            .filter_map(|id| self.get(id))
            .map(|p| p.reference.clone())
            .collect()
    }
}

/// Whether `path` names a package descriptor.
pub fn is_package_descriptor(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == PACKAGE_DESCRIPTOR)
}

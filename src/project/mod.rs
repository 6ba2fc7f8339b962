//! Packages and workspace folders on disk.

mod error;
pub mod packages;
pub mod workspace_loader;

pub use error::ProjectError;
pub use packages::{PackageInfo, PackageRegistry, is_package_descriptor};
pub use workspace_loader::{LoadSummary, WorkspaceFiles, WorkspaceLoader, load_and_parse};

//! Helpers for setting up analysis hosts.

use std::path::Path;

use crossmodel::FileId;
use crossmodel::ide::AnalysisHost;
use crossmodel::project::PackageInfo;

/// Directory of the package every `/ws/shop/...` fixture belongs to.
pub const SHOP_DIR: &str = "/ws/shop";

pub fn shop_package() -> PackageInfo {
    PackageInfo::new("shop", Some("1.0.0".to_string()), SHOP_DIR, Vec::new())
}

/// Creates an AnalysisHost with the `shop` package and the given files.
pub fn host_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let host = AnalysisHost::new();
    host.register_package(shop_package());
    for (path, content) in files {
        host.set_file_content(*path, content);
    }
    host
}

/// Creates an AnalysisHost with a single file inside the `shop` package.
pub fn host_from_source(source: &str, filename: &str) -> (AnalysisHost, FileId) {
    let path = format!("{SHOP_DIR}/{filename}");
    let host = host_from_sources(&[(path.as_str(), source)]);
    let file_id = host_file(&host, &path);
    (host, file_id)
}

/// FileId of a path added to the host.
pub fn host_file(host: &AnalysisHost, path: &str) -> FileId {
    host.analysis()
        .file_id(Path::new(path))
        .unwrap_or_else(|| panic!("{path} should be in the workspace"))
}

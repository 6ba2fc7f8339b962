//! Domain constants shared across layers.

/// Extension shared by every CrossModel file.
pub const CM_EXTENSION: &str = "cm";

/// Sub-extensions signalling the role of a file.
pub const ENTITY_EXTENSION: &str = ".entity.cm";
pub const RELATIONSHIP_EXTENSION: &str = ".relationship.cm";
pub const MAPPING_EXTENSION: &str = ".mapping.cm";
pub const SYSTEM_DIAGRAM_EXTENSION: &str = ".system-diagram.cm";
/// Legacy alias for [`SYSTEM_DIAGRAM_EXTENSION`].
pub const DIAGRAM_EXTENSION: &str = ".diagram.cm";

/// Package descriptor file name.
pub const PACKAGE_DESCRIPTOR: &str = "package.json";

/// Separator between the segments of a qualified id.
pub const ID_SEPARATOR: char = '.';

/// Package id and reference name used when a document belongs to no package.
pub const UNKNOWN_PACKAGE_ID: &str = "unknown";
pub const UNKNOWN_PACKAGE_REFERENCE: &str = "unknown";

//! Parsed CrossModel files and file-type detection.

use crate::base::LineIndex;
use crate::base::constants::{
    CM_EXTENSION, DIAGRAM_EXTENSION, ENTITY_EXTENSION, MAPPING_EXTENSION, RELATIONSHIP_EXTENSION,
    SYSTEM_DIAGRAM_EXTENSION,
};
use crate::parser::{Ast, Parse, SyntaxError, SyntaxKind, parse, tokenize_raw};

/// The role of a `.cm` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Entity,
    Relationship,
    Mapping,
    SystemDiagram,
    /// A plain `.cm` file whose content could not be sniffed.
    Generic,
}

impl FileType {
    /// Detect the file type from the sub-extension, if there is one.
    pub fn from_path(path: &str) -> Option<FileType> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(ENTITY_EXTENSION) {
            Some(FileType::Entity)
        } else if lower.ends_with(RELATIONSHIP_EXTENSION) {
            Some(FileType::Relationship)
        } else if lower.ends_with(MAPPING_EXTENSION) {
            Some(FileType::Mapping)
        } else if lower.ends_with(SYSTEM_DIAGRAM_EXTENSION) || lower.ends_with(DIAGRAM_EXTENSION) {
            Some(FileType::SystemDiagram)
        } else {
            None
        }
    }

    /// Detect the file type from the first keyword of the content.
    pub fn sniff(text: &str) -> Option<FileType> {
        let first = tokenize_raw(text)
            .into_iter()
            .find(|t| !t.kind.is_trivia() && t.kind != SyntaxKind::NEWLINE)?;
        match first.kind {
            SyntaxKind::ENTITY_KW => Some(FileType::Entity),
            SyntaxKind::RELATIONSHIP_KW => Some(FileType::Relationship),
            SyntaxKind::MAPPING_KW => Some(FileType::Mapping),
            SyntaxKind::SYSTEM_DIAGRAM_KW | SyntaxKind::DIAGRAM_KW => Some(FileType::SystemDiagram),
            _ => None,
        }
    }

    /// Extension first, content second.
    pub fn detect(path: &str, text: &str) -> FileType {
        Self::from_path(path)
            .or_else(|| Self::sniff(text))
            .unwrap_or(FileType::Generic)
    }
}

/// Whether `path` names a CrossModel file.
pub fn is_cm_file(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(CM_EXTENSION))
}

/// A parsed file together with its detected role and line index.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxFile {
    parse: Parse,
    file_type: FileType,
    line_index: LineIndex,
}

impl SyntaxFile {
    pub fn new(path: &str, text: &str) -> Self {
        Self {
            parse: parse(text),
            file_type: FileType::detect(path, text),
            line_index: LineIndex::new(text),
        }
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn ast(&self) -> &Ast {
        &self.parse.ast
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.parse.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.parse.errors.is_empty()
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

//! Syntax layer: parsed files, file types, identifier escaping and the
//! AST → text serializer.

pub mod escape;
pub mod file;
mod options;
pub mod serializer;

pub use escape::{combine_ids, is_valid_id, quote_string, to_id, to_id_reference};
pub use file::{FileType, SyntaxFile, is_cm_file};
pub use options::{LineEnding, SerializerOptions};
pub use serializer::{serialize, serialize_async};

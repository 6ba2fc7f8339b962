//! Parser tests over complete model files.

pub mod tests_documents;

//! Serializer tests.

pub mod tests_serializer;

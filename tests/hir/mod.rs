//! HIR layer tests
//!
//! - Id allocation
//! - Local, project and dependency scopes
//! - Derived attributes
//! - Validation rules

pub mod tests_ids;
pub mod tests_resolution;
pub mod tests_validation;

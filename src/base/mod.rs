//! Foundation types for the CrossModel toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Lightweight document handles
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - Domain constants (file extensions, package descriptor, separators)
//!
//! This module has NO dependencies on other crossmodel modules.

pub mod constants;
mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;

//! Parser error handling
//!
//! - [`ErrorCode`]: categorized codes for filtering and documentation
//! - [`SyntaxError`]: a recoverable parse problem
//! - [`LexError`]: a tokenizer failure that stops the parse

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{LexError, SyntaxError};

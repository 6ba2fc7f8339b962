//! Parser for the CrossModel textual format
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → base tokens with SyntaxKind
//!     ↓
//! Indentation layer → INDENT / DEDENT synthesized per line
//!     ↓
//! Parser (recursive descent) → typed AST arena
//!     ↓
//! HIR → scopes, linking, validation
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
pub mod errors;
pub mod indent;
mod lexer;
mod syntax_kind;

pub use ast::*;
pub use errors::{ErrorCode, LexError, SyntaxError};
pub use indent::tokenize;
pub use lexer::{Lexer, Token, is_keyword, tokenize_raw};
pub use parser::{Parse, parse, unescape_string};
pub use syntax_kind::SyntaxKind;

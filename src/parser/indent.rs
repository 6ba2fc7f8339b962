//! Indentation-aware tokenization.
//!
//! Layers synthesized [`SyntaxKind::INDENT`] and [`SyntaxKind::DEDENT`]
//! tokens onto the base token stream so the grammar can treat blocks like
//! bracketed groups.
//!
//! Every line start is measured:
//!
//! - the run of leading blanks (space or tab, one column each);
//! - when that run is followed by `-` characters and then a blank or the end
//!   of the line, the dashes and the blanks after them are added, so a list
//!   item's first property and its continuation lines share one level;
//! - empty lines and lines whose first non-blank character opens a comment
//!   are skipped; whitespace-only lines are measured.
//!
//! A wider line pushes its width and emits one INDENT. A narrower line pops
//! until the top of the stack equals its width, one DEDENT per pop, and fails
//! with [`LexError::IndentationError`] when no level matches. At the end of
//! input the remaining levels are flushed as DEDENTs at `text.len()`.
//!
//! Synthesized tokens are zero-width and sit right after the line's leading
//! whitespace token. The stack lives in the call, so independent documents
//! can be tokenized in parallel.

use super::errors::LexError;
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use crate::base::TextSize;

/// How a line takes part in indentation tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineShape {
    /// Empty or comment-only line.
    Skipped,
    /// Indentation width in columns.
    Measured(u32),
}

/// Tokenize `text` including INDENT/DEDENT tokens.
///
/// Fails on the first unknown token or inconsistent dedent.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, LexError> {
    let raw: Vec<Token<'_>> = Lexer::new(text).collect();
    if let Some(bad) = raw.iter().find(|t| t.kind == SyntaxKind::ERROR) {
        return Err(LexError::UnknownToken {
            text: bad.text.to_string(),
            range: bad.range(),
        });
    }

    let mut stack: Vec<u32> = vec![0];
    let mut tokens = Vec::with_capacity(raw.len() + 8);
    let mut line_start = Some(0usize);

    for token in raw {
        let Some(start) = line_start.take() else {
            push_token(&mut tokens, token, &mut line_start);
            continue;
        };

        // The leading whitespace token stays before the synthesized tokens.
        let (anchor, pending) = if token.kind == SyntaxKind::WHITESPACE {
            let end = token.range().end();
            tokens.push(token);
            (end, None)
        } else {
            (token.offset, Some(token))
        };

        if let LineShape::Measured(width) = measure_line(text, start) {
            adjust_stack(&mut stack, width, anchor, &mut tokens)?;
        }

        if let Some(token) = pending {
            push_token(&mut tokens, token, &mut line_start);
        }
    }

    let eof = TextSize::of(text);
    while stack.len() > 1 {
        stack.pop();
        tokens.push(synthetic(SyntaxKind::DEDENT, eof));
    }

    Ok(tokens)
}

fn push_token<'a>(tokens: &mut Vec<Token<'a>>, token: Token<'a>, line_start: &mut Option<usize>) {
    if token.kind == SyntaxKind::NEWLINE {
        *line_start = Some(usize::from(token.range().end()));
    }
    tokens.push(token);
}

fn adjust_stack<'a>(
    stack: &mut Vec<u32>,
    width: u32,
    anchor: TextSize,
    tokens: &mut Vec<Token<'a>>,
) -> Result<(), LexError> {
    let top = stack.last().copied().unwrap_or(0);
    if width > top {
        stack.push(width);
        tokens.push(synthetic(SyntaxKind::INDENT, anchor));
    } else if width < top {
        while stack.last().is_some_and(|&level| level > width) {
            stack.pop();
            tokens.push(synthetic(SyntaxKind::DEDENT, anchor));
        }
        if stack.last() != Some(&width) {
            return Err(LexError::IndentationError {
                offset: anchor,
                width,
            });
        }
    }
    Ok(())
}

fn synthetic<'a>(kind: SyntaxKind, offset: TextSize) -> Token<'a> {
    Token {
        kind,
        text: "",
        offset,
    }
}

/// Measure the line starting at byte offset `start`.
fn measure_line(text: &str, start: usize) -> LineShape {
    let line = &text[start..];
    let line = match line.find('\n') {
        Some(end) => &line[..end],
        None => line,
    };
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return LineShape::Skipped;
    }

    let bytes = line.as_bytes();
    let is_blank = |b: u8| b == b' ' || b == b'\t';

    let mut pos = bytes.iter().take_while(|&&b| is_blank(b)).count();
    if bytes.get(pos) == Some(&b'#') {
        return LineShape::Skipped;
    }

    let dashes = bytes[pos..].iter().take_while(|&&b| b == b'-').count();
    if dashes > 0 {
        let after = pos + dashes;
        if bytes.get(after).is_none_or(|&b| is_blank(b)) {
            pos = after + bytes[after..].iter().take_while(|&&b| is_blank(b)).count();
        }
    }

    LineShape::Measured(pos as u32)
}

/// Kinds of the tokens the grammar sees (trivia dropped).
pub fn significant_kinds(tokens: &[Token<'_>]) -> Vec<SyntaxKind> {
    tokens
        .iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect()
}

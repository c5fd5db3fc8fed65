//! The table-driven pushdown parser.
//!
//! # Design
//!
//! Each nonterminal is a DFA over labels. The parser keeps an explicit stack
//! of frames, one per nonterminal instance being recognised, and advances it
//! one token at a time:
//!
//! 1. **Shift**: the top frame has a terminal arc for the label.
//! 2. **Push**: the top frame has an arc through a nonterminal whose
//!    first-set contains the label; descend into it and retry.
//! 3. **Pop**: the top frame has no arc but is accepting; fold its node into
//!    the frame below and retry there.
//!
//! The frame that will consume a token is located before anything is
//! mutated, so a failing [`Parser::addtoken`] leaves the parser exactly as it
//! was.
//!
//! There is no error recovery at this layer. The first token that cannot be
//! consumed ends the parse with a [`ParseError`]; what to do next is up to
//! the caller.

#![allow(clippy::module_inception)]

mod driver;
mod parser;

pub use driver::{parse_str, parse_tokens};
pub use parser::Parser;

use std::fmt::Write as _;

use serde::Serialize;
use text_size::TextRange;
use thiserror::Error;

use crate::grammar::{Grammar, Label};
use crate::token::Token;

/// The three ways a parse can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorKind {
    /// No frame can consume the token.
    #[error("unexpected token")]
    UnexpectedToken,
    /// Input ended while the start symbol was still incomplete.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// The token matches no entry of the grammar's label tables.
    #[error("unresolved label")]
    UnresolvedLabel,
}

/// A parsing error.
///
/// Always describes a single failure at a single token; a parse that
/// produced a `ParseError` produced no tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The error message.
    pub message: String,
    /// The offending token. For a missing end of input this is a
    /// zero-width `ENDMARKER` just past the last token seen.
    pub token: Token,
    /// Labels that would have been accepted instead, in ascending order.
    pub expected: Vec<Label>,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        token: Token,
        expected: Vec<Label>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            token,
            expected,
        }
    }

    /// The byte range where the error occurred.
    #[must_use]
    pub fn range(&self) -> TextRange {
        self.token.range
    }

    /// One diagnostic line naming the token and what was expected.
    #[must_use]
    pub fn render(&self, grammar: &Grammar) -> String {
        let mut line = format!("{}: {}", self.kind, self.message);
        if !self.token.kind.is_endmarker() {
            let _ = write!(
                line,
                ", found {} {:?}",
                grammar.token_name(self.token.kind),
                self.token.text.as_str()
            );
        }
        if !self.expected.is_empty() {
            let expected: Vec<String> = self
                .expected
                .iter()
                .map(|&label| grammar.describe_label(label))
                .collect();
            let _ = write!(line, "; expected {}", expected.join(", "));
        }
        line
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range().start()),
            u32::from(self.range().end())
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    #[test]
    fn display_names_the_range() {
        let token = Token::new(TokenType::NAME, "b", TextRange::new(2.into(), 3.into()));
        let error = ParseError::new(ParseErrorKind::UnexpectedToken, "bad input", token, vec![]);
        assert_eq!(error.to_string(), "bad input at 2..3");
        assert_eq!(error.kind.to_string(), "unexpected token");
    }
}

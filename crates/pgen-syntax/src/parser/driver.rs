//! Parse entrypoints.
//!
//! These own the token loop: each token's label is resolved exactly once
//! and fed to a fresh [`Parser`]. Tokens are pulled lazily, so a tokenizer
//! reading a file incrementally never needs to buffer it.

use text_size::TextSize;

use crate::grammar::{Grammar, SymbolId};
use crate::lexer::Lexer;
use crate::parser::{ParseError, ParseErrorKind, Parser};
use crate::pnode::PNode;
use crate::token::Token;

/// Parses a token stream as `start`.
///
/// Tokens after the one that completes the parse are not pulled from the
/// iterator.
///
/// # Errors
///
/// Returns the first [`ParseError`]: an unresolvable token, a token no frame
/// can consume, or a stream that ends before the start symbol is complete.
///
/// # Panics
///
/// Panics if `start` is not a symbol of `grammar`.
pub fn parse_tokens<I>(grammar: &Grammar, start: SymbolId, tokens: I) -> Result<PNode, ParseError>
where
    I: IntoIterator<Item = Token>,
{
    let mut parser = Parser::new(grammar);
    parser.setup(start);

    let mut end = TextSize::from(0);
    for token in tokens {
        end = token.range.end();
        if parser.push_token(token)? {
            break;
        }
    }

    let expected = parser.expected();
    parser.into_rootnode().ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            "missing end marker",
            Token::endmarker(end),
            expected,
        )
    })
}

/// Tokenizes `source` with the reference [`Lexer`] and parses it as `start`.
///
/// # Errors
///
/// As [`parse_tokens`]. Characters the lexer cannot classify surface as an
/// `unresolved-label` error unless the grammar has a label for
/// `ERRORTOKEN`.
///
/// # Panics
///
/// Panics if `start` is not a symbol of `grammar`.
pub fn parse_str(grammar: &Grammar, start: SymbolId, source: &str) -> Result<PNode, ParseError> {
    parse_tokens(grammar, start, Lexer::new(source))
}

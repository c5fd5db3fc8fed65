//! Reference tokenizer.
//!
//! The parser itself is tokenizer-agnostic: anything that yields
//! [`Token`]s in source order and finishes with an `ENDMARKER` will do.
//! This `logos`-based lexer covers the common case of grammars written over
//! names, numbers, strings, and punctuation.

mod tokens;

pub use tokens::LexKind;

use logos::Logos;
use text_size::{TextRange, TextSize};

use crate::token::{Token, TokenType};

/// Lexer for source text.
///
/// The lexer is an iterator over tokens. Unrecognised input is returned as
/// `ERRORTOKEN` rather than stopping the stream, and the final item is
/// always a zero-width `ENDMARKER` at the end of the source.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, LexKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: LexKind::lexer(source),
            source,
            finished: false,
        }
    }

    /// Returns the source text being lexed.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(kind) = self.inner.next() else {
            self.finished = true;
            return Some(Token::endmarker(text_size_of(self.source.len())));
        };
        let span = self.inner.span();
        let kind = kind.map_or(TokenType::ERRORTOKEN, TokenType::from);
        let range = TextRange::new(text_size_of(span.start), text_size_of(span.end));

        Some(Token::new(kind, self.inner.slice(), range))
    }
}

fn text_size_of(offset: usize) -> TextSize {
    // Sources past 4 GiB are not supported by `text-size`; clamp rather than wrap.
    TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX))
}

/// Lex the entire source, including the trailing `ENDMARKER`.
///
/// Convenient for tests and small inputs. The parser entrypoints accept the
/// [`Lexer`] iterator directly, so large inputs never need buffering.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

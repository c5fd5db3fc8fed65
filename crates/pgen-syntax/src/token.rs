//! Lexical tokens as seen by the parser.
//!
//! A token is an immutable `(type, text, range)` triple. The parser never
//! inspects the text itself; label resolution against the grammar's keyword
//! table is the only place the exact lexeme matters.

use serde::Serialize;
use smol_str::SmolStr;
use text_size::TextRange;

/// Nonterminal symbol ids start here; every code below it is a token type.
pub const NT_OFFSET: u16 = 256;

/// A small-integer lexical category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenType(pub u16);

impl TokenType {
    /// End of input. Every token stream ends with exactly one of these.
    pub const ENDMARKER: TokenType = TokenType(0);
    /// Identifiers and keywords.
    pub const NAME: TokenType = TokenType(1);
    /// Integer and floating point literals.
    pub const NUMBER: TokenType = TokenType(2);
    /// Quoted string literals.
    pub const STRING: TokenType = TokenType(3);
    /// Punctuation and operators.
    pub const OP: TokenType = TokenType(4);
    /// Input the tokenizer could not classify.
    pub const ERRORTOKEN: TokenType = TokenType(5);

    /// Returns `true` for the end-of-input marker.
    #[must_use]
    pub fn is_endmarker(self) -> bool {
        self == Self::ENDMARKER
    }

    /// Returns `true` if the code is usable as a terminal type.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.0 < NT_OFFSET
    }

    /// Name of one of the reserved codes above.
    #[must_use]
    pub fn builtin_name(self) -> Option<&'static str> {
        match self {
            Self::ENDMARKER => Some("ENDMARKER"),
            Self::NAME => Some("NAME"),
            Self::NUMBER => Some("NUMBER"),
            Self::STRING => Some("STRING"),
            Self::OP => Some("OP"),
            Self::ERRORTOKEN => Some("ERRORTOKEN"),
            _ => None,
        }
    }
}

impl From<u16> for TokenType {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

/// A positioned token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    /// The lexical category.
    pub kind: TokenType,
    /// The exact source lexeme.
    pub text: SmolStr,
    /// The byte range of the lexeme in the source text.
    #[serde(serialize_with = "serialize_range")]
    pub range: TextRange,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenType, text: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }

    /// Creates a zero-width end marker at `offset`.
    #[must_use]
    pub fn endmarker(offset: text_size::TextSize) -> Self {
        Self::new(TokenType::ENDMARKER, "", TextRange::empty(offset))
    }
}

fn serialize_range<S: serde::Serializer>(
    range: &TextRange,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let raw = [u32::from(range.start()), u32::from(range.end())];
    raw.serialize(serializer)
}

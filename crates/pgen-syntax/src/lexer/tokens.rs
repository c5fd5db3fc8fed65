//! Raw lexical classes recognised by the reference tokenizer.

use logos::Logos;

use crate::token::TokenType;

/// Lexical classes before they are folded into grammar token types.
///
/// Whitespace and `#` line comments are skipped outright, so every class
/// here is significant to the parser.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip(r"#[^\r\n]*", allow_greedy = true))]
pub enum LexKind {
    /// Identifier or keyword.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    /// Integer or decimal literal.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    /// Single or double quoted string with backslash escapes.
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    String,

    /// Multi-character operators, longest match first.
    #[token("**")]
    #[token("//")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<<")]
    #[token(">>")]
    #[token("->")]
    #[token(":=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("&&")]
    #[token("||")]
    #[token("...")]
    #[regex(r"[-+*/%<>=!&|^~@.,:;()\[\]{}?]")]
    Op,
}

impl From<LexKind> for TokenType {
    fn from(kind: LexKind) -> Self {
        match kind {
            LexKind::Name => TokenType::NAME,
            LexKind::Number => TokenType::NUMBER,
            LexKind::String => TokenType::STRING,
            LexKind::Op => TokenType::OP,
        }
    }
}

//! `pgen-syntax` - Table-driven incremental LL(1) parsing.
//!
//! This crate is the syntax-analysis core of a language front end. Given a
//! compiled grammar (one DFA per nonterminal plus label and keyword tables)
//! and a stream of tokens, it builds a concrete parse tree one token at a
//! time and reports the exact token at which the input leaves the grammar.
//!
//! - **Grammar**: Immutable compiled tables, loaded once and shared
//! - **Parser**: Pushdown automaton driven by one `addtoken` call per token
//! - **PNode**: The concrete parse tree, assembled bottom-up
//! - **Lexer**: A reference tokenizer for names, numbers, strings, and operators
//!
//! # Example
//!
//! ```
//! use pgen_syntax::grammar::GrammarBuilder;
//! use pgen_syntax::parser::parse_str;
//! use pgen_syntax::TokenType;
//!
//! // pair: NAME '=' NUMBER
//! let mut builder = GrammarBuilder::new();
//! let pair = builder.symbol("pair");
//! builder
//!     .rule(pair)
//!     .token(0, TokenType::NAME, 1)
//!     .keyword(1, TokenType::OP, "=", 2)
//!     .token(2, TokenType::NUMBER, 3)
//!     .accept(3);
//! builder.start("pair", pair);
//! let grammar = builder.build().unwrap();
//!
//! let tree = parse_str(&grammar, pair, "answer = 42").unwrap();
//! let leaves: Vec<_> = tree.leaves().map(|t| t.text.as_str()).collect();
//! assert_eq!(leaves, ["answer", "=", "42"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod pnode;
pub mod syntax;
pub mod token;

pub use grammar::{Grammar, Label, MalformedGrammar, SymbolId};
pub use lexer::{lex, Lexer};
pub use parser::{parse_str, parse_tokens, ParseError, ParseErrorKind, Parser};
pub use pnode::{NodeKind, PNode};
pub use syntax::{PgenLanguage, SyntaxNode, SyntaxToken};
pub use token::{Token, TokenType, NT_OFFSET};

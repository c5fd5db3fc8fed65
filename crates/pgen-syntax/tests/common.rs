//! Shared helpers for parser tests.
#![allow(dead_code, unused_imports)]

pub use pgen_syntax::grammar::Grammar;
pub use pgen_syntax::parser::{parse_str, parse_tokens, ParseError, ParseErrorKind, Parser};
pub use pgen_syntax::{lex, PNode, Token, TokenType};

/// `S: 'a' S 'b' | 'c'`
pub fn nested_grammar() -> Grammar {
    Grammar::load(include_str!("../../../grammars/nested.json")).expect("nested grammar")
}

/// Statements, assignments, and arithmetic, ending in `ENDMARKER`.
pub fn calc_grammar() -> Grammar {
    Grammar::load(include_str!("../../../grammars/calc.json")).expect("calc grammar")
}

/// Parses `source` from the named start symbol and formats the tree, or
/// the diagnostic line on failure.
pub fn snapshot_parse(grammar: &Grammar, start: &str, source: &str) -> String {
    let start = grammar.start_symbol(start).expect("start symbol");
    match parse_str(grammar, start, source) {
        Ok(tree) => tree.to_tree_string(grammar),
        Err(err) => format!("{err}\n{}\n", err.render(grammar)),
    }
}

/// Feeds every token through `Parser::addtoken`, returning the result of
/// each call up to and including the first error.
pub fn feed(grammar: &Grammar, start: &str, source: &str) -> Vec<Result<bool, ParseError>> {
    let start = grammar.start_symbol(start).expect("start symbol");
    let mut parser = Parser::new(grammar);
    parser.setup(start);
    let mut results = Vec::new();
    for token in lex(source) {
        let label = grammar
            .resolve_label(token.kind, &token.text)
            .expect("token resolves");
        let result = parser.addtoken(token.kind, token, label);
        let stop = result.is_err();
        results.push(result);
        if stop {
            break;
        }
    }
    results
}

/// Largest stack depth seen while parsing `source`.
pub fn max_stack_depth(grammar: &Grammar, start: &str, source: &str) -> usize {
    let start = grammar.start_symbol(start).expect("start symbol");
    let mut parser = Parser::new(grammar);
    parser.setup(start);
    let mut max = parser.stack_depth();
    for token in lex(source) {
        let done = parser.push_token(token).expect("valid input");
        max = max.max(parser.stack_depth());
        if done {
            break;
        }
    }
    max
}

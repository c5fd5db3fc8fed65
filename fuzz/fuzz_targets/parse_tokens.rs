#![no_main]

use libfuzzer_sys::fuzz_target;
use pgen_syntax::{lex, parse_tokens, Grammar, Parser};

const MAX_SOURCE_BYTES: usize = 4096;
const CALC: &str = include_str!("../../grammars/calc.json");

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fuzz_target!(|data: &[u8]| {
    let Ok(grammar) = Grammar::load(CALC) else {
        return;
    };
    let source = decode_source(data);
    let tokens = lex(&source);

    for (name, start) in grammar.start_symbols() {
        let result = parse_tokens(&grammar, start, tokens.iter().cloned());
        let again = parse_tokens(&grammar, start, tokens.iter().cloned());
        assert_eq!(result, again, "parse of `{name}` is not deterministic");

        if let Ok(tree) = &result {
            // Leaves are exactly the tokens consumed, in order.
            let leaves: Vec<_> = tree.leaves().collect();
            assert!(leaves.iter().zip(&tokens).all(|(leaf, token)| *leaf == token));
            continue;
        }

        // A rejected token must leave the parser where it was.
        let mut parser = Parser::new(&grammar);
        parser.setup(start);
        for token in &tokens {
            let depth = parser.stack_depth();
            let expected = parser.expected();
            match parser.push_token(token.clone()) {
                Ok(true) => break,
                Ok(false) => {}
                Err(_) => {
                    assert_eq!(parser.stack_depth(), depth);
                    assert_eq!(parser.expected(), expected);
                    break;
                }
            }
        }
    }
});

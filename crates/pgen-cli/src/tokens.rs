//! `pgen tokens`: dump the reference tokenizer's output.

use anyhow::Context;
use pgen_syntax::{Lexer, Token};
use std::fmt::Write as _;
use std::path::Path;

use crate::cli::OutputFormat;

pub fn run(path: &Path, format: OutputFormat, ranges: bool) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tokens: Vec<Token> = Lexer::new(&source).collect();
    match format {
        OutputFormat::Tree => print!("{}", render(&tokens, ranges)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&tokens)?),
    }
    Ok(())
}

fn render(tokens: &[Token], ranges: bool) -> String {
    let mut out = String::new();
    for token in tokens {
        let name = token.kind.builtin_name().unwrap_or("?");
        let text = token.text.as_str();
        let _ = if ranges {
            writeln!(out, "{name}@{:?} {text:?}", token.range)
        } else {
            writeln!(out, "{name} {text:?}")
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use pgen_syntax::lex;

    #[test]
    fn renders_builtin_names() {
        expect![[r#"
NAME@0..1 "x"
OP@2..3 "="
STRING@4..8 "'hi'"
OP@8..9 ";"
ENDMARKER@9..9 ""
"#]]
        .assert_eq(&render(&lex("x = 'hi';"), true));
    }

    #[test]
    fn renders_without_ranges() {
        expect![[r#"
NUMBER "7"
ERRORTOKEN "$"
ENDMARKER ""
"#]]
        .assert_eq(&render(&lex("7 $"), false));
    }
}

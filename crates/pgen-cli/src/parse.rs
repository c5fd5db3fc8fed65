//! `pgen parse`: parse a file and print the tree or a diagnostic.

use anyhow::{bail, Context};
use pgen_syntax::{parse_str, Grammar, ParseError, PNode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use text_size::TextSize;
use tracing::debug;

use crate::check::load_grammar;
use crate::cli::OutputFormat;
use crate::config::Config;

/// Options for one `pgen parse` run, flags already merged over config.
#[derive(Debug)]
pub struct ParseOptions {
    pub file: PathBuf,
    pub grammar: Option<PathBuf>,
    pub start: Option<String>,
    pub format: OutputFormat,
    pub ranges: bool,
}

impl ParseOptions {
    pub fn new(
        file: PathBuf,
        grammar: Option<PathBuf>,
        start: Option<String>,
        format: Option<OutputFormat>,
        config: &Config,
    ) -> Self {
        Self {
            file,
            grammar: grammar.or_else(|| config.grammar.clone()),
            start: start.or_else(|| config.start.clone()),
            format: format.unwrap_or(config.format),
            ranges: config.ranges,
        }
    }
}

/// Returns `Ok(false)` when the input does not parse; the diagnostic has
/// already been printed.
pub fn run(options: &ParseOptions) -> anyhow::Result<bool> {
    let Some(grammar_path) = &options.grammar else {
        bail!("no grammar given; pass --grammar or set [grammar] path in pgen.toml");
    };
    let grammar = load_grammar(grammar_path)?;
    let start = match &options.start {
        Some(name) => match grammar.start_symbol(name) {
            Some(symbol) => symbol,
            None => {
                let known: Vec<&str> = grammar.start_symbols().map(|(name, _)| name).collect();
                bail!("unknown start symbol `{name}` (known: {})", known.join(", "));
            }
        },
        None => match grammar.start_symbols().next() {
            Some((_, symbol)) => symbol,
            None => bail!("grammar declares no start symbols"),
        },
    };

    let source = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;
    debug!(
        "parsing {} as {}",
        options.file.display(),
        grammar.symbol_name(start).unwrap_or("?")
    );

    match parse_str(&grammar, start, &source) {
        Ok(tree) => {
            print!("{}", render_tree(&grammar, &tree, options)?);
            Ok(true)
        }
        Err(err) => {
            eprintln!("{}", diagnostic(&options.file, &source, &grammar, &err));
            Ok(false)
        }
    }
}

fn render_tree(grammar: &Grammar, tree: &PNode, options: &ParseOptions) -> anyhow::Result<String> {
    Ok(match options.format {
        OutputFormat::Tree if options.ranges => tree.to_tree_string(grammar),
        OutputFormat::Tree => tree.to_outline(grammar),
        OutputFormat::Json => {
            let symbols: BTreeMap<u16, &str> = grammar
                .dfas()
                .iter()
                .map(|dfa| (dfa.symbol().0, dfa.name()))
                .collect();
            let document = serde_json::json!({ "symbols": symbols, "tree": tree });
            format!("{}\n", serde_json::to_string(&document)?)
        }
    })
}

/// `file:line:column: <rendered error>`
fn diagnostic(file: &Path, source: &str, grammar: &Grammar, err: &ParseError) -> String {
    let (line, column) = line_col(source, err.range().start());
    format!("{}:{line}:{column}: {}", file.display(), err.render(grammar))
}

/// One-based line and column (in characters) of a byte offset.
fn line_col(source: &str, offset: TextSize) -> (usize, usize) {
    let offset = usize::from(offset).min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_syntax::Token;
    use text_size::TextRange;

    fn calc() -> Grammar {
        Grammar::load(include_str!("../../../grammars/calc.json")).expect("grammar")
    }

    fn options(format: OutputFormat, ranges: bool) -> ParseOptions {
        ParseOptions {
            file: PathBuf::from("input.calc"),
            grammar: None,
            start: None,
            format,
            ranges,
        }
    }

    #[test]
    fn line_col_counts_lines_and_chars() {
        let source = "a = 1;\nbé = ;\n";
        assert_eq!(line_col(source, TextSize::from(0)), (1, 1));
        assert_eq!(line_col(source, TextSize::from(4)), (1, 5));
        assert_eq!(line_col(source, TextSize::from(7)), (2, 1));
        // `é` is two bytes but one column.
        assert_eq!(line_col(source, TextSize::from(13)), (2, 6));
        assert_eq!(line_col(source, TextSize::from(99)), (3, 1));
    }

    #[test]
    fn diagnostic_names_position_token_and_expected() {
        let grammar = calc();
        let source = "x = 1;\ny = ;\n";
        let start = grammar.start_symbol("file_input").expect("start");
        let err = parse_str(&grammar, start, source).expect_err("missing operand");
        assert_eq!(
            diagnostic(Path::new("input.calc"), source, &grammar, &err),
            "input.calc:2:5: unexpected token: bad input, found OP \";\"; expected NAME, NUMBER, '('"
        );
    }

    #[test]
    fn end_of_input_diagnostic_omits_token() {
        let grammar = calc();
        let err = ParseError {
            kind: pgen_syntax::ParseErrorKind::UnexpectedEndOfInput,
            message: "incomplete input".to_string(),
            token: Token::endmarker(TextSize::from(3)),
            expected: Vec::new(),
        };
        assert_eq!(err.range(), TextRange::empty(TextSize::from(3)));
        assert_eq!(
            diagnostic(Path::new("f"), "x =", &grammar, &err),
            "f:1:4: unexpected end of input: incomplete input"
        );
    }

    #[test]
    fn json_output_carries_symbol_names() {
        let grammar = calc();
        let start = grammar.start_symbol("expr").expect("start");
        let tree = parse_str(&grammar, start, "7").expect("tree");
        let json = render_tree(&grammar, &tree, &options(OutputFormat::Json, true)).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["symbols"]["258"], "expr");
        assert_eq!(value["symbols"].as_object().map(|map| map.len()), Some(5));
        assert!(value["tree"].is_object());
    }

    #[test]
    fn tree_output_respects_ranges() {
        let grammar = calc();
        let start = grammar.start_symbol("expr").expect("start");
        let tree = parse_str(&grammar, start, "7").expect("tree");
        let plain =
            render_tree(&grammar, &tree, &options(OutputFormat::Tree, false)).expect("tree");
        assert_eq!(plain, "expr\n  term\n    atom\n      NUMBER \"7\"\n");
    }

    #[test]
    fn flags_override_config() {
        let config = Config::from_contents(
            None,
            "[grammar]\npath = \"g.json\"\nstart = \"stmt\"\n[output]\nformat = \"json\"\n",
        );
        let merged = ParseOptions::new(
            PathBuf::from("in"),
            None,
            Some("expr".to_string()),
            Some(OutputFormat::Tree),
            &config,
        );
        assert_eq!(merged.grammar, Some(PathBuf::from("g.json")));
        assert_eq!(merged.start.as_deref(), Some("expr"));
        assert_eq!(merged.format, OutputFormat::Tree);
    }
}

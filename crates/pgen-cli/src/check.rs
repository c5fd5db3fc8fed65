//! `pgen check`: load, validate, and summarise a grammar table.

use anyhow::Context;
use pgen_syntax::{Grammar, Label};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let grammar = load_grammar(path)?;
    print!("{}", report(&grammar));
    Ok(())
}

pub(crate) fn load_grammar(path: &Path) -> anyhow::Result<Grammar> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grammar {}", path.display()))?;
    let grammar = Grammar::load(&contents)
        .with_context(|| format!("invalid grammar {}", path.display()))?;
    info!("loaded grammar {}", path.display());
    Ok(grammar)
}

fn report(grammar: &Grammar) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "grammar: {}", grammar.summary());

    let _ = writeln!(out, "symbols:");
    for dfa in grammar.dfas() {
        let mut first: Vec<Label> = dfa.first().iter().copied().collect();
        first.sort_unstable();
        let first: Vec<String> = first
            .into_iter()
            .map(|label| grammar.describe_label(label))
            .collect();
        let _ = writeln!(
            out,
            "  {} {}: {} states, first {}",
            dfa.symbol().0,
            dfa.name(),
            dfa.states().len(),
            first.join(", ")
        );
    }

    let _ = writeln!(out, "labels:");
    for label in (0..=u16::MAX).take(grammar.label_count()).map(Label) {
        let _ = writeln!(out, "  {} {}", label.0, grammar.describe_label(label));
    }

    let _ = writeln!(out, "start:");
    for (name, symbol) in grammar.start_symbols() {
        let target = grammar.symbol_name(symbol).unwrap_or("?");
        let _ = writeln!(out, "  {name} = {target}");
    }
    out
}

//! Loading and dumping serialized grammar tables.

use tracing::debug;

use super::validate::compile;
use super::{
    Grammar, GrammarTable, LabelEntry, LabelKind, MalformedGrammar, StateEntry, SymbolEntry,
    GRAMMAR_FORMAT_VERSION,
};

impl Grammar {
    /// Parses and validates a serialized grammar table.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGrammar`] if the table is not valid JSON, has
    /// dangling state indices or out-of-range labels, declares first-sets
    /// that disagree with its DFAs, or is not LL(1). Any of these means the
    /// table was built wrong; there is nothing a caller can do per parse.
    pub fn load(serialized: &str) -> Result<Self, MalformedGrammar> {
        let table: GrammarTable = serde_json::from_str(serialized)
            .map_err(|err| MalformedGrammar::Syntax(err.to_string().into()))?;
        Self::from_table(table)
    }

    /// Validates an already-deserialized table.
    ///
    /// # Errors
    ///
    /// See [`Grammar::load`].
    pub fn from_table(table: GrammarTable) -> Result<Self, MalformedGrammar> {
        let grammar = compile(table)?;
        debug!(summary = %grammar.summary(), "loaded grammar table");
        Ok(grammar)
    }

    /// Converts back to the serialized form.
    #[must_use]
    pub fn to_table(&self) -> GrammarTable {
        let labels = self
            .labels
            .iter()
            .map(|label| match label {
                LabelKind::Terminal { kind, text } => LabelEntry::Token {
                    kind: kind.0,
                    text: text.clone(),
                },
                LabelKind::Symbol(symbol) => LabelEntry::Symbol(symbol.0),
            })
            .collect();

        let symbols = self
            .dfas
            .iter()
            .map(|dfa| {
                let states = dfa
                    .states
                    .iter()
                    .map(|state| StateEntry {
                        arcs: state
                            .arcs
                            .iter()
                            .map(|arc| (arc.label.0, arc.target))
                            .collect(),
                        accepting: state.accepting,
                    })
                    .collect();
                let mut first: Vec<u16> = dfa.first.iter().map(|label| label.0).collect();
                first.sort_unstable();
                SymbolEntry {
                    name: dfa.name.clone(),
                    states,
                    first,
                }
            })
            .collect();

        let start = self
            .starts
            .iter()
            .map(|(name, symbol)| (name.clone(), self.dfas[symbol.index()].name.clone()))
            .collect();

        GrammarTable {
            version: GRAMMAR_FORMAT_VERSION,
            token_names: self.token_names.clone(),
            labels,
            symbols,
            start,
        }
    }

    /// Serializes to the JSON table format read by [`Grammar::load`].
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures; none are expected for a valid grammar.
    pub fn dump(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_table())
    }
}

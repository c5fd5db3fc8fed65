//! Serialized grammar table format.
//!
//! The table is plain JSON so that any grammar compiler, in any language,
//! can emit it. Integers are used throughout; names appear only where a
//! human reading a dump needs them.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Current table format version.
pub const GRAMMAR_FORMAT_VERSION: u32 = 1;

/// The on-disk form of a compiled grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTable {
    pub version: u32,
    /// Display names for token type codes, used in diagnostics.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_names: BTreeMap<u16, SmolStr>,
    pub labels: Vec<LabelEntry>,
    /// Symbol `i` has id `NT_OFFSET + i`.
    pub symbols: Vec<SymbolEntry>,
    /// Start name to symbol name.
    pub start: IndexMap<SmolStr, SmolStr>,
}

/// One entry of the global label table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEntry {
    /// A terminal, matched by token type and, for keywords and exact
    /// operators, by text.
    Token {
        #[serde(rename = "type")]
        kind: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<SmolStr>,
    },
    /// A nonterminal, by symbol id.
    Symbol(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: SmolStr,
    /// State 0 is the initial state.
    pub states: Vec<StateEntry>,
    /// Labels that can begin this symbol, in ascending order.
    pub first: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// `(label, target state)` pairs.
    pub arcs: Vec<(u16, u32)>,
    #[serde(default)]
    pub accepting: bool,
}

/// A defect in a compiled grammar table.
///
/// These indicate a broken build artifact, not bad input to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGrammar {
    #[error("invalid grammar table: {0}")]
    Syntax(SmolStr),
    #[error("unsupported grammar table version {0}")]
    UnsupportedVersion(u32),
    #[error("grammar table defines no symbols")]
    NoSymbols,
    #[error("grammar table defines too many symbols ({0})")]
    TooManySymbols(usize),
    #[error("grammar table defines too many labels ({0})")]
    TooManyLabels(usize),
    #[error("duplicate symbol name '{0}'")]
    DuplicateSymbol(SmolStr),
    #[error("symbol '{0}' has no states")]
    EmptyDfa(SmolStr),
    #[error("symbol '{symbol}' state {state}: arc target {target} out of range")]
    DanglingState {
        symbol: SmolStr,
        state: u32,
        target: u32,
    },
    #[error("symbol '{symbol}' state {state}: label {label} out of range")]
    LabelOutOfRange {
        symbol: SmolStr,
        state: u32,
        label: u16,
    },
    #[error("label {label} refers to unknown symbol {symbol}")]
    UnknownSymbol { label: u16, symbol: u16 },
    #[error("label {label} uses token type {kind}, which is not a terminal code")]
    InvalidTokenType { label: u16, kind: u16 },
    #[error("label {label} duplicates label {previous}")]
    DuplicateLabel { label: u16, previous: u16 },
    #[error("symbol '{0}' can derive the empty string")]
    NullableSymbol(SmolStr),
    #[error("left recursion through symbol '{0}'")]
    LeftRecursion(SmolStr),
    #[error("symbol '{0}': declared first set does not match its DFA")]
    FirstSetMismatch(SmolStr),
    #[error("symbol '{symbol}' state {state} is ambiguous on label {label}")]
    Ambiguous {
        symbol: SmolStr,
        state: u32,
        label: u16,
    },
    #[error("start '{name}' names unknown symbol '{symbol}'")]
    UnknownStartSymbol { name: SmolStr, symbol: SmolStr },
    #[error("grammar table declares no start symbols")]
    NoStartSymbols,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_entries_use_external_tags() {
        let json = r#"[{"token":{"type":1,"text":"if"}},{"token":{"type":2}},{"symbol":256}]"#;
        let labels: Vec<LabelEntry> = serde_json::from_str(json).expect("labels");
        assert_eq!(
            labels,
            vec![
                LabelEntry::Token {
                    kind: 1,
                    text: Some("if".into())
                },
                LabelEntry::Token {
                    kind: 2,
                    text: None
                },
                LabelEntry::Symbol(256),
            ]
        );
        assert_eq!(serde_json::to_string(&labels).expect("serialize"), json);
    }

    #[test]
    fn accepting_defaults_to_false() {
        let state: StateEntry = serde_json::from_str(r#"{"arcs":[[0,1]]}"#).expect("state");
        assert!(!state.accepting);
        assert_eq!(state.arcs, vec![(0, 1)]);
    }
}

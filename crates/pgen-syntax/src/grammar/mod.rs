//! Compiled grammar tables.
//!
//! A [`Grammar`] holds one DFA per nonterminal, the global label table that
//! maps tokens to arc labels, and the precomputed first-sets that let the
//! parser decide on a push without backtracking. It is built once, either by
//! [`Grammar::load`] from a serialized table or by [`GrammarBuilder`], and is
//! never mutated afterwards, so any number of parsers may share it across
//! threads.

mod builder;
mod format;
mod load;
mod validate;

pub use builder::{GrammarBuilder, SymbolBuilder};
pub use format::{
    GrammarTable, LabelEntry, MalformedGrammar, StateEntry, SymbolEntry, GRAMMAR_FORMAT_VERSION,
};

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smol_str::SmolStr;

use crate::token::{TokenType, NT_OFFSET};

/// Index of a state within one nonterminal's DFA. State 0 is initial.
pub type StateId = u32;

/// A nonterminal symbol id, always `>= NT_OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SymbolId(pub u16);

impl SymbolId {
    /// Position of this symbol's DFA in the grammar.
    ///
    /// Ids below `NT_OFFSET` are not symbols; they map to an index past the
    /// last symbol any grammar can hold, so lookups by index miss.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
            .checked_sub(NT_OFFSET)
            .map_or(usize::from(u16::MAX), usize::from)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        // Callers only pass indices already bounded by `MAX_SYMBOLS`.
        Self(NT_OFFSET + index as u16)
    }
}

/// An index into the grammar's label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(pub u16);

impl Label {
    /// Label given to an `ENDMARKER` token when the grammar has no entry of
    /// its own for it. No arc carries this label, so the end marker can only
    /// complete a parse whose frames are all accepting.
    pub const IMPLICIT_END: Label = Label(u16::MAX);

    /// Position of this label in the label table.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// What a label stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// A token of type `kind`, with `text` set for keyword and exact-match
    /// labels.
    Terminal {
        /// The token type.
        kind: TokenType,
        /// Exact lexeme, if this label only matches one spelling.
        text: Option<SmolStr>,
    },
    /// A nonterminal.
    Symbol(SymbolId),
}

/// One transition of a DFA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaArc {
    /// The label consumed along this arc.
    pub label: Label,
    /// The state reached.
    pub target: StateId,
}

/// One state of a nonterminal's DFA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    arcs: Vec<DfaArc>,
    accepting: bool,
    /// Terminal label to index into `arcs`, covering both direct terminal
    /// arcs and nonterminal arcs through their first-sets.
    lookup: FxHashMap<Label, usize>,
}

impl DfaState {
    /// Outgoing arcs in table order.
    #[must_use]
    pub fn arcs(&self) -> &[DfaArc] {
        &self.arcs
    }

    /// Whether the nonterminal may end in this state.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The arc that consumes the terminal `label` from this state, either by
    /// shifting it or by pushing a nonterminal whose first-set contains it.
    #[must_use]
    pub fn arc_for(&self, label: Label) -> Option<DfaArc> {
        self.lookup.get(&label).map(|&index| self.arcs[index])
    }

    /// Terminal labels this state can consume, in ascending order.
    #[must_use]
    pub fn expected(&self) -> Vec<Label> {
        let mut labels: Vec<_> = self.lookup.keys().copied().collect();
        labels.sort_unstable();
        labels
    }
}

/// The DFA for one nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    symbol: SymbolId,
    name: SmolStr,
    states: Vec<DfaState>,
    first: FxHashSet<Label>,
}

impl Dfa {
    /// The nonterminal this DFA recognises.
    #[must_use]
    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    /// The nonterminal's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All states; index 0 is initial.
    #[must_use]
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// A single state. Panics if `state` is not from this DFA.
    #[must_use]
    pub fn state(&self, state: StateId) -> &DfaState {
        &self.states[state as usize]
    }

    /// Terminal labels that can begin this nonterminal.
    #[must_use]
    pub fn first(&self) -> &FxHashSet<Label> {
        &self.first
    }
}

/// A compiled, immutable grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    labels: Vec<LabelKind>,
    /// Keyword and exact-operator labels: type, then text.
    exact: FxHashMap<TokenType, FxHashMap<SmolStr, Label>>,
    /// Labels matching any token of a type.
    generic: FxHashMap<TokenType, Label>,
    dfas: Vec<Dfa>,
    symbols: FxHashMap<SmolStr, SymbolId>,
    starts: IndexMap<SmolStr, SymbolId>,
    token_names: BTreeMap<u16, SmolStr>,
}

impl Grammar {
    /// Maps a token to its label: the exact-text table first, then the
    /// table for the bare token type. Returns `None` when neither matches.
    ///
    /// An `ENDMARKER` always resolves, to [`Label::IMPLICIT_END`] if the
    /// grammar does not mention it.
    #[must_use]
    pub fn resolve_label(&self, kind: TokenType, text: &str) -> Option<Label> {
        self.exact
            .get(&kind)
            .and_then(|by_text| by_text.get(text))
            .or_else(|| self.generic.get(&kind))
            .copied()
            .or_else(|| kind.is_endmarker().then_some(Label::IMPLICIT_END))
    }

    /// Terminal labels that can begin `symbol`.
    #[must_use]
    pub fn first_set(&self, symbol: SymbolId) -> Option<&FxHashSet<Label>> {
        self.dfa(symbol).map(Dfa::first)
    }

    /// The DFA for `symbol`.
    #[must_use]
    pub fn dfa(&self, symbol: SymbolId) -> Option<&Dfa> {
        if symbol.0 < NT_OFFSET {
            return None;
        }
        self.dfas.get(symbol.index())
    }

    /// All DFAs, ordered by symbol id.
    #[must_use]
    pub fn dfas(&self) -> &[Dfa] {
        &self.dfas
    }

    /// What `label` stands for.
    #[must_use]
    pub fn label(&self, label: Label) -> Option<&LabelKind> {
        self.labels.get(label.index())
    }

    /// Number of entries in the label table.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Looks up a nonterminal by name.
    #[must_use]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    /// The name of a nonterminal.
    #[must_use]
    pub fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.dfa(symbol).map(Dfa::name)
    }

    /// Looks up a start symbol by its start name.
    #[must_use]
    pub fn start_symbol(&self, name: &str) -> Option<SymbolId> {
        self.starts.get(name).copied()
    }

    /// Start names and their symbols, in declaration order.
    pub fn start_symbols(&self) -> impl Iterator<Item = (&str, SymbolId)> + '_ {
        self.starts.iter().map(|(name, &symbol)| (name.as_str(), symbol))
    }

    /// Display name for a token type: the table's own name, then the
    /// built-in name, then the raw code.
    #[must_use]
    pub fn token_name(&self, kind: TokenType) -> SmolStr {
        if let Some(name) = self.token_names.get(&kind.0) {
            return name.clone();
        }
        match kind.builtin_name() {
            Some(name) => SmolStr::new(name),
            None => SmolStr::from(format!("token {}", kind.0)),
        }
    }

    /// Human-readable form of a label for diagnostics: exact text quoted,
    /// token types and symbols by name.
    #[must_use]
    pub fn describe_label(&self, label: Label) -> String {
        match self.label(label) {
            Some(LabelKind::Terminal {
                text: Some(text), ..
            }) => format!("'{text}'"),
            Some(LabelKind::Terminal { kind, text: None }) => self.token_name(*kind).to_string(),
            Some(LabelKind::Symbol(symbol)) => self
                .symbol_name(*symbol)
                .map_or_else(|| format!("symbol {}", symbol.0), str::to_string),
            None if label == Label::IMPLICIT_END => "end of input".to_string(),
            None => format!("label {}", label.0),
        }
    }

    /// Counts for logging and reports.
    #[must_use]
    pub fn summary(&self) -> GrammarSummary {
        let states = self.dfas.iter().map(|dfa| dfa.states.len()).sum();
        let arcs = self
            .dfas
            .iter()
            .flat_map(|dfa| &dfa.states)
            .map(|state| state.arcs.len())
            .sum();
        GrammarSummary {
            symbols: self.dfas.len(),
            labels: self.labels.len(),
            states,
            arcs,
            starts: self.starts.len(),
        }
    }
}

/// Size of a grammar, for logging and the `check` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarSummary {
    /// Number of nonterminals.
    pub symbols: usize,
    /// Number of label table entries.
    pub labels: usize,
    /// Total DFA states.
    pub states: usize,
    /// Total DFA arcs.
    pub arcs: usize,
    /// Number of start symbols.
    pub starts: usize,
}

impl fmt::Display for GrammarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} symbols, {} labels, {} states, {} arcs, {} start symbols",
            self.symbols, self.labels, self.states, self.arcs, self.starts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_grammar() -> Grammar {
        // stmt: 'print' NAME | NAME '=' NUMBER
        let mut builder = GrammarBuilder::new();
        builder.token_name(TokenType::NAME, "NAME");
        let stmt = builder.symbol("stmt");
        builder
            .rule(stmt)
            .keyword(0, TokenType::NAME, "print", 1)
            .token(0, TokenType::NAME, 2)
            .token(1, TokenType::NAME, 4)
            .keyword(2, TokenType::OP, "=", 3)
            .token(3, TokenType::NUMBER, 4)
            .accept(4);
        builder.start("stmt", stmt);
        builder.build().expect("valid grammar")
    }

    #[test]
    fn keyword_table_is_checked_before_type_table() {
        let grammar = keyword_grammar();
        let print = grammar
            .resolve_label(TokenType::NAME, "print")
            .expect("keyword label");
        let name = grammar
            .resolve_label(TokenType::NAME, "x")
            .expect("name label");
        assert_ne!(print, name);
        assert_eq!(
            grammar.label(print),
            Some(&LabelKind::Terminal {
                kind: TokenType::NAME,
                text: Some("print".into())
            })
        );
        assert_eq!(grammar.describe_label(print), "'print'");
        assert_eq!(grammar.describe_label(name), "NAME");
    }

    #[test]
    fn unknown_tokens_resolve_to_none() {
        let grammar = keyword_grammar();
        assert_eq!(grammar.resolve_label(TokenType::STRING, "'s'"), None);
        assert_eq!(
            grammar.resolve_label(TokenType::ENDMARKER, ""),
            Some(Label::IMPLICIT_END)
        );
        assert_eq!(grammar.describe_label(Label::IMPLICIT_END), "end of input");
        assert!(grammar.resolve_label(TokenType::OP, "=").is_some());
        assert_eq!(grammar.resolve_label(TokenType::OP, "+"), None);
    }

    #[test]
    fn first_set_covers_every_initial_arc() {
        let grammar = keyword_grammar();
        let stmt = grammar.symbol_id("stmt").expect("stmt");
        let first = grammar.first_set(stmt).expect("first set");
        let print = grammar.resolve_label(TokenType::NAME, "print");
        let name = grammar.resolve_label(TokenType::NAME, "y");
        assert_eq!(first.len(), 2);
        assert!(first.contains(&print.expect("print")));
        assert!(first.contains(&name.expect("name")));
    }

    #[test]
    fn lookups_by_name_and_id() {
        let grammar = keyword_grammar();
        let stmt = grammar.symbol_id("stmt").expect("stmt");
        assert_eq!(stmt, SymbolId(NT_OFFSET));
        assert_eq!(grammar.symbol_name(stmt), Some("stmt"));
        assert_eq!(grammar.start_symbol("stmt"), Some(stmt));
        assert_eq!(grammar.start_symbol("module"), None);
        assert_eq!(grammar.dfa(SymbolId(3)), None);
        assert_eq!(grammar.token_name(TokenType(77)), "token 77");
    }

    #[test]
    fn summary_counts_everything() {
        let summary = keyword_grammar().summary();
        assert_eq!(summary.symbols, 1);
        assert_eq!(summary.states, 5);
        assert_eq!(summary.arcs, 5);
        assert_eq!(summary.labels, 4);
        assert_eq!(
            summary.to_string(),
            "1 symbols, 4 labels, 5 states, 5 arcs, 1 start symbols"
        );
    }

    #[test]
    fn token_codes_are_not_symbol_indices() {
        assert_eq!(SymbolId(NT_OFFSET).index(), 0);
        assert_eq!(SymbolId(NT_OFFSET + 3).index(), 3);
        let grammar = keyword_grammar();
        assert!(grammar.dfa(SymbolId(TokenType::NAME.0)).is_none());
        assert!(grammar.first_set(SymbolId(0)).is_none());
        assert!(SymbolId(5).index() >= grammar.dfas().len());
    }
}

//! Programmatic grammar construction.
//!
//! This is the emitting half of the grammar-compiler contract: a compiler
//! (or a test) describes each nonterminal's DFA state by state, and the
//! builder interns labels, computes first-sets, and produces either a
//! serializable [`GrammarTable`] or a validated [`Grammar`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::validate::computed_first_sets;
use super::{
    Grammar, GrammarTable, LabelEntry, MalformedGrammar, StateEntry, StateId, SymbolEntry,
    SymbolId, GRAMMAR_FORMAT_VERSION,
};
use crate::token::TokenType;

/// Incrementally assembles a grammar table.
#[derive(Debug, Default, Clone)]
pub struct GrammarBuilder {
    token_names: BTreeMap<u16, SmolStr>,
    labels: Vec<LabelEntry>,
    label_index: FxHashMap<LabelEntry, u16>,
    symbols: Vec<SymbolEntry>,
    symbol_index: FxHashMap<SmolStr, SymbolId>,
    start: IndexMap<SmolStr, SmolStr>,
}

impl GrammarBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diagnostic name of a token type.
    pub fn token_name(&mut self, kind: TokenType, name: impl Into<SmolStr>) -> &mut Self {
        self.token_names.insert(kind.0, name.into());
        self
    }

    /// Declares a nonterminal, or returns the id it was first declared with.
    pub fn symbol(&mut self, name: impl Into<SmolStr>) -> SymbolId {
        let name = name.into();
        if let Some(&symbol) = self.symbol_index.get(&name) {
            return symbol;
        }
        let symbol = SymbolId::from_index(self.symbols.len());
        self.symbols.push(SymbolEntry {
            name: name.clone(),
            states: Vec::new(),
            first: Vec::new(),
        });
        self.symbol_index.insert(name, symbol);
        symbol
    }

    /// Starts describing the DFA of `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was not returned by [`GrammarBuilder::symbol`] on
    /// this builder.
    pub fn rule(&mut self, symbol: SymbolId) -> SymbolBuilder<'_> {
        assert!(
            symbol.index() < self.symbols.len(),
            "symbol {} not declared",
            symbol.0
        );
        SymbolBuilder {
            builder: self,
            index: symbol.index(),
        }
    }

    /// Registers `symbol` as a start symbol under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was not returned by [`GrammarBuilder::symbol`] on
    /// this builder.
    pub fn start(&mut self, name: impl Into<SmolStr>, symbol: SymbolId) -> &mut Self {
        assert!(
            symbol.index() < self.symbols.len(),
            "symbol {} not declared",
            symbol.0
        );
        let symbol_name = self.symbols[symbol.index()].name.clone();
        self.start.insert(name.into(), symbol_name);
        self
    }

    fn intern(&mut self, entry: LabelEntry) -> u16 {
        if let Some(&label) = self.label_index.get(&entry) {
            return label;
        }
        // Label tables beyond u16 are rejected by validation; saturate here
        // so the oversize table still reaches it.
        let label = u16::try_from(self.labels.len()).unwrap_or(u16::MAX);
        self.labels.push(entry.clone());
        self.label_index.insert(entry, label);
        label
    }

    /// The serializable table, with first-sets filled in.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGrammar`] for structural defects that prevent
    /// first-set computation, such as left recursion.
    pub fn table(&self) -> Result<GrammarTable, MalformedGrammar> {
        let mut table = GrammarTable {
            version: GRAMMAR_FORMAT_VERSION,
            token_names: self.token_names.clone(),
            labels: self.labels.clone(),
            symbols: self.symbols.clone(),
            start: self.start.clone(),
        };
        let first = computed_first_sets(&table)?;
        for (symbol, first) in table.symbols.iter_mut().zip(first) {
            symbol.first = first;
        }
        Ok(table)
    }

    /// Builds and validates the grammar.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedGrammar`] under the same conditions as
    /// [`Grammar::load`].
    pub fn build(&self) -> Result<Grammar, MalformedGrammar> {
        Grammar::from_table(self.table()?)
    }
}

/// Adds states and arcs to one nonterminal's DFA.
///
/// States are created on first mention; state 0 is the initial state.
pub struct SymbolBuilder<'b> {
    builder: &'b mut GrammarBuilder,
    index: usize,
}

impl SymbolBuilder<'_> {
    fn state_mut(&mut self, state: StateId) -> &mut StateEntry {
        let states = &mut self.builder.symbols[self.index].states;
        let needed = state as usize + 1;
        if states.len() < needed {
            states.resize_with(needed, || StateEntry {
                arcs: Vec::new(),
                accepting: false,
            });
        }
        &mut states[state as usize]
    }

    fn arc(mut self, from: StateId, entry: LabelEntry, to: StateId) -> Self {
        let label = self.builder.intern(entry);
        self.state_mut(to);
        self.state_mut(from).arcs.push((label, to));
        self
    }

    /// An arc consuming any token of type `kind`.
    pub fn token(self, from: StateId, kind: TokenType, to: StateId) -> Self {
        self.arc(
            from,
            LabelEntry::Token {
                kind: kind.0,
                text: None,
            },
            to,
        )
    }

    /// An arc consuming a token of type `kind` spelled exactly `text`.
    pub fn keyword(self, from: StateId, kind: TokenType, text: &str, to: StateId) -> Self {
        self.arc(
            from,
            LabelEntry::Token {
                kind: kind.0,
                text: Some(text.into()),
            },
            to,
        )
    }

    /// An arc through the nonterminal `symbol`.
    pub fn nonterminal(self, from: StateId, symbol: SymbolId, to: StateId) -> Self {
        self.arc(from, LabelEntry::Symbol(symbol.0), to)
    }

    /// Marks `state` as accepting.
    pub fn accept(mut self, state: StateId) -> Self {
        self.state_mut(state).accepting = true;
        self
    }
}

//! Grammar table validation and first-set computation.
//!
//! Everything the parser later relies on without checking is established
//! here: indices are in range, first-sets are exact, and every state is
//! deterministic under LL(1) lookahead.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::{
    Dfa, DfaArc, DfaState, Grammar, GrammarTable, Label, LabelEntry, LabelKind, MalformedGrammar,
    SymbolId, GRAMMAR_FORMAT_VERSION,
};
use crate::token::{TokenType, NT_OFFSET};

const MAX_SYMBOLS: usize = (u16::MAX - NT_OFFSET) as usize + 1;
const MAX_LABELS: usize = u16::MAX as usize;

/// Label and symbol tables resolved from a [`GrammarTable`].
struct Tables {
    labels: Vec<LabelKind>,
    exact: FxHashMap<TokenType, FxHashMap<SmolStr, Label>>,
    generic: FxHashMap<TokenType, Label>,
    symbols: FxHashMap<SmolStr, SymbolId>,
}

/// Validates `table` and builds the in-memory grammar.
pub(super) fn compile(table: GrammarTable) -> Result<Grammar, MalformedGrammar> {
    let tables = check_structure(&table)?;
    let first = first_sets(&table, &tables.labels)?;

    for (entry, computed) in table.symbols.iter().zip(&first) {
        let declared: FxHashSet<Label> = entry.first.iter().copied().map(Label).collect();
        if declared.len() != entry.first.len() || declared != *computed {
            return Err(MalformedGrammar::FirstSetMismatch(entry.name.clone()));
        }
    }

    let mut dfas = Vec::with_capacity(table.symbols.len());
    for (index, entry) in table.symbols.iter().enumerate() {
        let mut states = Vec::with_capacity(entry.states.len());
        for (state_index, state) in entry.states.iter().enumerate() {
            let arcs: Vec<DfaArc> = state
                .arcs
                .iter()
                .map(|&(label, target)| DfaArc {
                    label: Label(label),
                    target,
                })
                .collect();
            let lookup = build_lookup(&entry.name, state_index, &arcs, &tables.labels, &first)?;
            states.push(DfaState {
                arcs,
                accepting: state.accepting,
                lookup,
            });
        }
        dfas.push(Dfa {
            symbol: SymbolId::from_index(index),
            name: entry.name.clone(),
            states,
            first: first[index].clone(),
        });
    }

    if table.start.is_empty() {
        return Err(MalformedGrammar::NoStartSymbols);
    }
    let mut starts = IndexMap::with_capacity(table.start.len());
    for (name, symbol_name) in &table.start {
        let Some(&symbol) = tables.symbols.get(symbol_name) else {
            return Err(MalformedGrammar::UnknownStartSymbol {
                name: name.clone(),
                symbol: symbol_name.clone(),
            });
        };
        starts.insert(name.clone(), symbol);
    }

    Ok(Grammar {
        labels: tables.labels,
        exact: tables.exact,
        generic: tables.generic,
        dfas,
        symbols: tables.symbols,
        starts,
        token_names: table.token_names,
    })
}

/// First-sets of every symbol in `table`, as sorted raw labels.
///
/// Used by [`super::GrammarBuilder`] to fill in the `first` column before
/// handing the table to [`compile`].
pub(super) fn computed_first_sets(table: &GrammarTable) -> Result<Vec<Vec<u16>>, MalformedGrammar> {
    let tables = check_structure(table)?;
    let first = first_sets(table, &tables.labels)?;
    Ok(first
        .into_iter()
        .map(|set| {
            let mut raw: Vec<u16> = set.into_iter().map(|label| label.0).collect();
            raw.sort_unstable();
            raw
        })
        .collect())
}

fn check_structure(table: &GrammarTable) -> Result<Tables, MalformedGrammar> {
    if table.version != GRAMMAR_FORMAT_VERSION {
        return Err(MalformedGrammar::UnsupportedVersion(table.version));
    }
    if table.symbols.is_empty() {
        return Err(MalformedGrammar::NoSymbols);
    }
    if table.symbols.len() > MAX_SYMBOLS {
        return Err(MalformedGrammar::TooManySymbols(table.symbols.len()));
    }
    if table.labels.len() > MAX_LABELS {
        return Err(MalformedGrammar::TooManyLabels(table.labels.len()));
    }

    let mut symbols = FxHashMap::default();
    for (index, entry) in table.symbols.iter().enumerate() {
        if symbols
            .insert(entry.name.clone(), SymbolId::from_index(index))
            .is_some()
        {
            return Err(MalformedGrammar::DuplicateSymbol(entry.name.clone()));
        }
    }

    let mut labels = Vec::with_capacity(table.labels.len());
    let mut exact: FxHashMap<TokenType, FxHashMap<SmolStr, Label>> = FxHashMap::default();
    let mut generic = FxHashMap::default();
    let mut symbol_labels = FxHashMap::default();
    for (index, entry) in table.labels.iter().enumerate() {
        // Bounded by MAX_LABELS above.
        let label = Label(index as u16);
        let previous = match entry {
            LabelEntry::Token { kind, text } => {
                let kind = TokenType(*kind);
                if !kind.is_terminal() {
                    return Err(MalformedGrammar::InvalidTokenType {
                        label: label.0,
                        kind: kind.0,
                    });
                }
                labels.push(LabelKind::Terminal {
                    kind,
                    text: text.clone(),
                });
                match text {
                    Some(text) => exact.entry(kind).or_default().insert(text.clone(), label),
                    None => generic.insert(kind, label),
                }
            }
            LabelEntry::Symbol(raw) => {
                let symbol = SymbolId(*raw);
                if *raw < NT_OFFSET || symbol.index() >= table.symbols.len() {
                    return Err(MalformedGrammar::UnknownSymbol {
                        label: label.0,
                        symbol: *raw,
                    });
                }
                labels.push(LabelKind::Symbol(symbol));
                symbol_labels.insert(symbol, label)
            }
        };
        if let Some(previous) = previous {
            return Err(MalformedGrammar::DuplicateLabel {
                label: label.0,
                previous: previous.0,
            });
        }
    }

    for entry in &table.symbols {
        let Some(initial) = entry.states.first() else {
            return Err(MalformedGrammar::EmptyDfa(entry.name.clone()));
        };
        if initial.accepting {
            return Err(MalformedGrammar::NullableSymbol(entry.name.clone()));
        }
        for (state_index, state) in entry.states.iter().enumerate() {
            for &(label, target) in &state.arcs {
                if usize::from(label) >= labels.len() {
                    return Err(MalformedGrammar::LabelOutOfRange {
                        symbol: entry.name.clone(),
                        state: state_index as u32,
                        label,
                    });
                }
                if target as usize >= entry.states.len() {
                    return Err(MalformedGrammar::DanglingState {
                        symbol: entry.name.clone(),
                        state: state_index as u32,
                        target,
                    });
                }
            }
        }
    }

    Ok(Tables {
        labels,
        exact,
        generic,
        symbols,
    })
}

/// Computes the transitive first-set of every symbol from the arcs leaving
/// its initial state.
fn first_sets(
    table: &GrammarTable,
    labels: &[LabelKind],
) -> Result<Vec<FxHashSet<Label>>, MalformedGrammar> {
    let mut calc = FirstSets {
        table,
        labels,
        sets: vec![None; table.symbols.len()],
        visiting: vec![false; table.symbols.len()],
    };
    for index in 0..table.symbols.len() {
        calc.visit(index)?;
    }
    Ok(calc.sets.into_iter().map(Option::unwrap_or_default).collect())
}

struct FirstSets<'a> {
    table: &'a GrammarTable,
    labels: &'a [LabelKind],
    sets: Vec<Option<FxHashSet<Label>>>,
    visiting: Vec<bool>,
}

impl FirstSets<'_> {
    fn visit(&mut self, index: usize) -> Result<(), MalformedGrammar> {
        if self.sets[index].is_some() {
            return Ok(());
        }
        let table = self.table;
        let labels = self.labels;
        if self.visiting[index] {
            return Err(MalformedGrammar::LeftRecursion(
                table.symbols[index].name.clone(),
            ));
        }
        self.visiting[index] = true;

        let mut first = FxHashSet::default();
        for &(label, _) in &table.symbols[index].states[0].arcs {
            match &labels[usize::from(label)] {
                LabelKind::Terminal { .. } => {
                    first.insert(Label(label));
                }
                LabelKind::Symbol(symbol) => {
                    self.visit(symbol.index())?;
                    if let Some(sub) = &self.sets[symbol.index()] {
                        first.extend(sub.iter().copied());
                    }
                }
            }
        }

        self.visiting[index] = false;
        self.sets[index] = Some(first);
        Ok(())
    }
}

/// Maps every terminal label a state can consume to the arc that consumes
/// it, rejecting states where two arcs compete for one label.
fn build_lookup(
    symbol: &SmolStr,
    state: usize,
    arcs: &[DfaArc],
    labels: &[LabelKind],
    first: &[FxHashSet<Label>],
) -> Result<FxHashMap<Label, usize>, MalformedGrammar> {
    let mut lookup = FxHashMap::default();
    let mut claim = |label: Label, arc: usize| {
        if lookup.insert(label, arc).is_some() {
            Err(MalformedGrammar::Ambiguous {
                symbol: symbol.clone(),
                state: state as u32,
                label: label.0,
            })
        } else {
            Ok(())
        }
    };

    for (index, arc) in arcs.iter().enumerate() {
        match &labels[arc.label.index()] {
            LabelKind::Terminal { .. } => claim(arc.label, index)?,
            LabelKind::Symbol(sub) => {
                let mut sub_first: Vec<Label> = first[sub.index()].iter().copied().collect();
                sub_first.sort_unstable();
                for label in sub_first {
                    claim(label, index)?;
                }
            }
        }
    }
    Ok(lookup)
}

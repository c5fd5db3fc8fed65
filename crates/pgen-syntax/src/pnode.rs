//! Parse tree nodes.
//!
//! A [`PNode`] is either a leaf holding one shifted token or an interior
//! node for a completed nonterminal. Children are appended in source order
//! while the owning frame is on the parser stack and are never touched
//! again once it pops.

use std::fmt::Write as _;

use serde::Serialize;
use text_size::TextRange;

use crate::grammar::{Grammar, SymbolId};
use crate::token::{Token, TokenType, NT_OFFSET};

/// The type of a node: a token type on leaves, a symbol on interior nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A leaf.
    Token(TokenType),
    /// A nonterminal.
    Symbol(SymbolId),
}

impl NodeKind {
    /// The raw code, with symbols at or above `NT_OFFSET`.
    #[must_use]
    pub fn raw(self) -> u16 {
        match self {
            Self::Token(kind) => kind.0,
            Self::Symbol(symbol) => symbol.0,
        }
    }

    /// Inverse of [`NodeKind::raw`].
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        if raw < NT_OFFSET {
            Self::Token(TokenType(raw))
        } else {
            Self::Symbol(SymbolId(raw))
        }
    }
}

/// A node of the concrete parse tree.
///
/// Dropping, cloning, comparing, and dumping walk the tree with an explicit
/// stack, so arbitrarily deep trees never exhaust the call stack.
#[derive(Debug, Serialize)]
pub struct PNode {
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<Token>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<PNode>,
}

impl PNode {
    /// A leaf for a shifted token.
    #[must_use]
    pub fn leaf(token: Token) -> Self {
        Self {
            kind: NodeKind::Token(token.kind),
            token: Some(token),
            children: Vec::new(),
        }
    }

    /// An empty interior node for `symbol`.
    #[must_use]
    pub fn symbol(symbol: SymbolId) -> Self {
        Self {
            kind: NodeKind::Symbol(symbol),
            token: None,
            children: Vec::new(),
        }
    }

    /// This node without its children.
    fn shallow_clone(&self) -> Self {
        Self {
            kind: self.kind,
            token: self.token.clone(),
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: PNode) {
        self.children.push(child);
    }

    /// The node type.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The token, on leaves.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Children in source order; empty on leaves.
    #[must_use]
    pub fn children(&self) -> &[PNode] {
        &self.children
    }

    /// The `index`th child.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&PNode> {
        self.children.get(index)
    }

    /// Returns `true` for token leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.token.is_some()
    }

    /// The symbol of an interior node.
    #[must_use]
    pub fn symbol_id(&self) -> Option<SymbolId> {
        match self.kind {
            NodeKind::Symbol(symbol) => Some(symbol),
            NodeKind::Token(_) => None,
        }
    }

    /// All leaf tokens beneath this node, in source order.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Source range from the first leaf to the last.
    #[must_use]
    pub fn range(&self) -> Option<TextRange> {
        let mut leaves = self.leaves();
        let first = leaves.next()?.range;
        let last = leaves.last().map_or(first, |token| token.range);
        Some(first.cover(last))
    }

    /// Indented dump of the tree, one node per line, naming symbols and
    /// token types through `grammar`.
    #[must_use]
    pub fn to_tree_string(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.write_tree(grammar, &mut out, true);
        out
    }

    /// Like [`PNode::to_tree_string`] without source ranges.
    #[must_use]
    pub fn to_outline(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.write_tree(grammar, &mut out, false);
        out
    }

    fn write_tree(&self, grammar: &Grammar, out: &mut String, ranges: bool) {
        let mut pending = vec![(self, 0)];
        while let Some((node, depth)) = pending.pop() {
            let indent = "  ".repeat(depth);
            match (&node.kind, &node.token) {
                (_, Some(token)) => {
                    let name = grammar.token_name(token.kind);
                    let text = token.text.as_str();
                    let _ = if ranges {
                        writeln!(out, "{indent}{name}@{:?} {text:?}", token.range)
                    } else {
                        writeln!(out, "{indent}{name} {text:?}")
                    };
                }
                (NodeKind::Symbol(symbol), None) => {
                    let name = grammar.symbol_name(*symbol).unwrap_or("?");
                    let _ = match node.range().filter(|_| ranges) {
                        Some(range) => writeln!(out, "{indent}{name}@{range:?}"),
                        None => writeln!(out, "{indent}{name}"),
                    };
                }
                (NodeKind::Token(kind), None) => {
                    let _ = writeln!(out, "{indent}{}", grammar.token_name(*kind));
                }
            }
            pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }
}

impl Drop for PNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Clone for PNode {
    fn clone(&self) -> Self {
        // Each entry is a source node and its copy; a copy is complete once
        // it has as many children as its source.
        let mut pending = vec![(self, self.shallow_clone())];
        while let Some((source, copy)) = pending.pop() {
            if let Some(child) = source.children.get(copy.children.len()) {
                pending.push((source, copy));
                pending.push((child, child.shallow_clone()));
            } else if let Some((_, parent)) = pending.last_mut() {
                parent.children.push(copy);
            } else {
                return copy;
            }
        }
        unreachable!("the root copy is returned when it completes")
    }
}

impl PartialEq for PNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.kind != right.kind
                || left.token != right.token
                || left.children.len() != right.children.len()
            {
                return false;
            }
            pending.extend(left.children.iter().zip(&right.children));
        }
        true
    }
}

impl Eq for PNode {}

/// Iterator over the leaf tokens of a tree, left to right.
pub struct Leaves<'a> {
    stack: Vec<&'a PNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Some(token) = &node.token {
                return Some(token);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}

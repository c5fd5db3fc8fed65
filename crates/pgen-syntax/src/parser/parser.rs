//! Main parser implementation.

use crate::grammar::{Dfa, DfaState, Grammar, Label, LabelKind, StateId, SymbolId};
use crate::parser::{ParseError, ParseErrorKind};
use crate::pnode::PNode;
use crate::token::{Token, TokenType};

/// One active DFA walk for one nonterminal instance.
struct Frame<'g> {
    dfa: &'g Dfa,
    state: StateId,
    node: PNode,
    /// The parent's state once this frame pops.
    return_state: StateId,
}

impl<'g> Frame<'g> {
    fn new(dfa: &'g Dfa, return_state: StateId) -> Self {
        Self {
            dfa,
            state: 0,
            node: PNode::symbol(dfa.symbol()),
            return_state,
        }
    }
}

/// Outcome of searching the stack for a frame that can take a label.
enum Search {
    /// The frame at this depth has an arc for the label; every frame above
    /// it is accepting.
    Found(usize),
    /// Nothing can take the label. `accepting` is set when every frame down
    /// to the bottom is accepting.
    Stuck { accepting: bool },
}

/// The parser state.
///
/// A parser borrows an immutable [`Grammar`] and drives exactly one parse:
/// [`Parser::setup`] once, then [`Parser::addtoken`] per token until it
/// returns `true`.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    /// Index 0 is the bottom frame, for the start symbol.
    stack: Vec<Frame<'g>>,
    rootnode: Option<PNode>,
}

impl<'g> Parser<'g> {
    /// Creates a parser over `grammar`. Call [`Parser::setup`] before feeding
    /// tokens.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            stack: Vec::new(),
            rootnode: None,
        }
    }

    /// The grammar this parser runs against.
    #[must_use]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Resets all state and starts a parse of `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start` is not a symbol of this parser's grammar.
    pub fn setup(&mut self, start: SymbolId) {
        let Some(dfa) = self.grammar.dfa(start) else {
            panic!("symbol {} is not defined by the grammar", start.0);
        };
        self.stack.clear();
        self.stack.push(Frame::new(dfa, 0));
        self.rootnode = None;
    }

    /// Feeds one token whose label has already been resolved.
    ///
    /// Returns `Ok(true)` once the start symbol is complete, after which the
    /// tree is available from [`Parser::rootnode`]. `Ok(false)` means more
    /// input is expected.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if no frame on the stack can consume
    /// `label`. The parser is left unchanged in that case.
    pub fn addtoken(
        &mut self,
        kind: TokenType,
        token: Token,
        label: Label,
    ) -> Result<bool, ParseError> {
        if self.stack.is_empty() {
            let message = if self.rootnode.is_some() {
                "too much input"
            } else {
                "parser not set up"
            };
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                message,
                token,
                Vec::new(),
            ));
        }

        let depth = match self.search(label) {
            Search::Found(depth) => depth,
            Search::Stuck { accepting: true } if kind.is_endmarker() => {
                self.finish();
                return Ok(true);
            }
            Search::Stuck { accepting } => {
                return Err(self.unexpected(kind, token, accepting));
            }
        };
        self.pop_to(depth);

        loop {
            let grammar = self.grammar;
            let top = self.top_mut();
            let Some(arc) = top.dfa.state(top.state).arc_for(label) else {
                // The search guarantees an arc here, and pushes only follow
                // first-sets that contain `label`.
                return Err(self.unexpected(kind, token, false));
            };

            if let Some(LabelKind::Symbol(symbol)) = grammar.label(arc.label) {
                if let Some(dfa) = grammar.dfa(*symbol) {
                    self.stack.push(Frame::new(dfa, arc.target));
                    continue;
                }
            }

            top.node.push_child(PNode::leaf(token));
            top.state = arc.target;
            if kind.is_endmarker() && self.all_accepting() {
                self.finish();
                return Ok(true);
            }
            return Ok(false);
        }
    }

    /// Resolves `token`'s label against the grammar and feeds it.
    ///
    /// # Errors
    ///
    /// Returns an `unresolved-label` [`ParseError`] if the grammar has no
    /// label for the token, otherwise as [`Parser::addtoken`].
    pub fn push_token(&mut self, token: Token) -> Result<bool, ParseError> {
        let Some(label) = self.grammar.resolve_label(token.kind, &token.text) else {
            return Err(ParseError::new(
                ParseErrorKind::UnresolvedLabel,
                "unknown token",
                token,
                Vec::new(),
            ));
        };
        self.addtoken(token.kind, token, label)
    }

    /// Returns `true` once the start symbol has been completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.rootnode.is_some()
    }

    /// Number of frames currently on the stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// The completed tree, once [`Parser::addtoken`] has returned `true`.
    #[must_use]
    pub fn rootnode(&self) -> Option<&PNode> {
        self.rootnode.as_ref()
    }

    /// Consumes the parser, returning the completed tree if there is one.
    #[must_use]
    pub fn into_rootnode(self) -> Option<PNode> {
        self.rootnode
    }

    /// Labels the next token may carry, in ascending order.
    ///
    /// This is the union over the top frame and every accepting frame that
    /// would pop to reach the one below it.
    #[must_use]
    pub fn expected(&self) -> Vec<Label> {
        let mut expected = Vec::new();
        for (_, state) in self.reachable_states() {
            expected.extend(state.expected());
            if !state.is_accepting() {
                break;
            }
        }
        expected.sort_unstable();
        expected.dedup();
        expected
    }

    fn top_mut(&mut self) -> &mut Frame<'g> {
        let index = self.stack.len() - 1;
        &mut self.stack[index]
    }

    /// The state each frame would be in if every frame above it popped,
    /// from the top of the stack down.
    fn reachable_states(&self) -> impl Iterator<Item = (usize, &'g DfaState)> + '_ {
        (0..self.stack.len()).rev().map(move |depth| {
            let state = match self.stack.get(depth + 1) {
                Some(child) => child.return_state,
                None => self.stack[depth].state,
            };
            let dfa: &'g Dfa = self.stack[depth].dfa;
            (depth, dfa.state(state))
        })
    }

    fn search(&self, label: Label) -> Search {
        for (depth, state) in self.reachable_states() {
            if state.arc_for(label).is_some() {
                return Search::Found(depth);
            }
            if !state.is_accepting() {
                return Search::Stuck { accepting: false };
            }
        }
        Search::Stuck { accepting: true }
    }

    fn all_accepting(&self) -> bool {
        self.reachable_states().all(|(_, state)| state.is_accepting())
    }

    /// Pops every frame above `depth`, folding each node into its parent.
    fn pop_to(&mut self, depth: usize) {
        while self.stack.len() > depth + 1 {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            let parent = self.top_mut();
            parent.node.push_child(frame.node);
            parent.state = frame.return_state;
        }
    }

    /// Folds the whole stack into the bottom frame and keeps its node.
    fn finish(&mut self) {
        self.pop_to(0);
        self.rootnode = self.stack.pop().map(|frame| frame.node);
    }

    fn unexpected(&self, kind: TokenType, token: Token, accepting: bool) -> ParseError {
        let (kind, message) = if kind.is_endmarker() {
            (ParseErrorKind::UnexpectedEndOfInput, "incomplete input")
        } else if accepting {
            (ParseErrorKind::UnexpectedToken, "too much input")
        } else {
            (ParseErrorKind::UnexpectedToken, "bad input")
        };
        ParseError::new(kind, message, token, self.expected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use text_size::TextRange;

    /// S: 'a' S 'b' | 'c'
    fn nested() -> (Grammar, SymbolId) {
        let mut builder = GrammarBuilder::new();
        let s = builder.symbol("S");
        builder
            .rule(s)
            .keyword(0, TokenType::NAME, "a", 1)
            .keyword(0, TokenType::NAME, "c", 3)
            .nonterminal(1, s, 2)
            .keyword(2, TokenType::NAME, "b", 3)
            .accept(3);
        builder.start("s", s);
        (builder.build().expect("grammar"), s)
    }

    fn token(text: &str, offset: u32) -> Token {
        let kind = if text.is_empty() {
            TokenType::ENDMARKER
        } else {
            TokenType::NAME
        };
        let end = offset + text.len() as u32;
        Token::new(kind, text, TextRange::new(offset.into(), end.into()))
    }

    #[test]
    fn shift_push_pop_build_nested_tree() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);

        let mut depths = Vec::new();
        for (offset, text) in ["a", "a", "c", "b", "b"].into_iter().enumerate() {
            let done = parser
                .push_token(token(text, offset as u32))
                .expect("token accepted");
            assert!(!done);
            depths.push(parser.stack_depth());
        }
        assert_eq!(depths, vec![1, 2, 3, 2, 1]);
        assert!(parser.push_token(token("", 5)).expect("end accepted"));
        assert!(parser.is_done());
        assert_eq!(parser.stack_depth(), 0);

        let root = parser.into_rootnode().expect("root");
        assert_eq!(root.symbol_id(), Some(s));
        assert_eq!(root.children().len(), 3);
        let middle = root.child(1).expect("nested S");
        assert_eq!(middle.symbol_id(), Some(s));
        assert_eq!(middle.child(1).and_then(PNode::symbol_id), Some(s));
    }

    #[test]
    fn failed_token_leaves_parser_unchanged() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);
        parser.push_token(token("a", 0)).expect("a");

        let error = parser.push_token(token("b", 1)).expect_err("b is not allowed");
        assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(error.message, "bad input");
        assert_eq!(parser.stack_depth(), 1);

        // The caller may carry on from the same point.
        parser.push_token(token("c", 1)).expect("c");
        parser.push_token(token("b", 2)).expect("b");
        assert!(parser.push_token(token("", 3)).expect("end"));
    }

    #[test]
    fn expected_lists_labels_of_all_poppable_frames() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);
        assert_eq!(parser.expected().len(), 2);

        parser.push_token(token("a", 0)).expect("a");
        parser.push_token(token("c", 1)).expect("c");
        // Inner S is complete; only 'b' continues the outer one.
        let expected: Vec<_> = parser
            .expected()
            .into_iter()
            .map(|label| grammar.describe_label(label))
            .collect();
        assert_eq!(expected, vec!["'b'"]);
    }

    #[test]
    fn input_after_completion_is_too_much() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);
        parser.push_token(token("c", 0)).expect("c");

        let error = parser.push_token(token("c", 1)).expect_err("second c");
        assert_eq!(error.message, "too much input");
        assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);

        assert!(parser.push_token(token("", 1)).expect("end"));
        let error = parser.push_token(token("c", 2)).expect_err("after done");
        assert_eq!(error.message, "too much input");
    }

    #[test]
    fn tokens_before_setup_are_rejected() {
        let (grammar, _) = nested();
        let mut parser = Parser::new(&grammar);
        let error = parser.push_token(token("c", 0)).expect_err("no setup");
        assert_eq!(error.message, "parser not set up");
    }

    #[test]
    fn early_end_marker_is_end_of_input() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);
        parser.push_token(token("a", 0)).expect("a");
        let error = parser.push_token(token("", 1)).expect_err("end too early");
        assert_eq!(error.kind, ParseErrorKind::UnexpectedEndOfInput);
    }

    #[test]
    fn setup_resets_a_finished_parser() {
        let (grammar, s) = nested();
        let mut parser = Parser::new(&grammar);
        parser.setup(s);
        parser.push_token(token("c", 0)).expect("c");
        assert!(parser.push_token(token("", 1)).expect("end"));

        parser.setup(s);
        assert!(!parser.is_done());
        assert_eq!(parser.stack_depth(), 1);
    }
}

//! A `rowan` view of completed parse trees.
//!
//! [`PNode`] is the parser's own output. Consumers that want parent
//! pointers, sibling navigation, or cheap structural sharing can convert a
//! finished tree into a `rowan` green tree. Only lexemes are stored, so
//! offsets in the `rowan` tree count lexeme bytes, not source bytes; use
//! the leaf tokens' ranges to map back to the source.

use crate::pnode::{NodeKind, PNode};

/// The `rowan` language tag for parse trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PgenLanguage {}

impl rowan::Language for PgenLanguage {
    type Kind = NodeKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        NodeKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind.raw())
    }
}

/// A syntax node in a `rowan` tree.
pub type SyntaxNode = rowan::SyntaxNode<PgenLanguage>;
/// A syntax token in a `rowan` tree.
pub type SyntaxToken = rowan::SyntaxToken<PgenLanguage>;
/// A syntax element (node or token) in a `rowan` tree.
pub type SyntaxElement = rowan::SyntaxElement<PgenLanguage>;

impl PNode {
    /// Builds an immutable green tree with the same shape.
    ///
    /// A leaf at the root is wrapped in a node of its own token kind so the
    /// result is always a node.
    #[must_use]
    pub fn to_green(&self) -> rowan::GreenNode {
        let mut builder = rowan::GreenNodeBuilder::new();
        if self.is_leaf() {
            builder.start_node(rowan::SyntaxKind(self.kind().raw()));
            add_to_builder(self, &mut builder);
            builder.finish_node();
        } else {
            add_to_builder(self, &mut builder);
        }
        builder.finish()
    }

    /// Builds a navigable `rowan` tree.
    #[must_use]
    pub fn to_syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.to_green())
    }
}

enum Step<'a> {
    Enter(&'a PNode),
    Exit,
}

fn add_to_builder(node: &PNode, builder: &mut rowan::GreenNodeBuilder<'static>) {
    let mut pending = vec![Step::Enter(node)];
    while let Some(step) = pending.pop() {
        let node = match step {
            Step::Enter(node) => node,
            Step::Exit => {
                builder.finish_node();
                continue;
            }
        };
        let kind = rowan::SyntaxKind(node.kind().raw());
        if let Some(token) = node.token() {
            builder.token(kind, token.text.as_str());
            continue;
        }
        builder.start_node(kind);
        pending.push(Step::Exit);
        pending.extend(node.children().iter().rev().map(Step::Enter));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolId;
    use crate::token::{Token, TokenType};
    use text_size::TextRange;

    #[test]
    fn green_tree_mirrors_pnode() {
        let mut inner = PNode::symbol(SymbolId(257));
        inner.push_child(PNode::leaf(Token::new(
            TokenType::NUMBER,
            "42",
            TextRange::new(4.into(), 6.into()),
        )));
        let mut root = PNode::symbol(SymbolId(256));
        root.push_child(PNode::leaf(Token::new(
            TokenType::NAME,
            "x",
            TextRange::new(0.into(), 1.into()),
        )));
        root.push_child(inner);

        let syntax = root.to_syntax();
        assert_eq!(syntax.kind(), NodeKind::Symbol(SymbolId(256)));
        assert_eq!(syntax.text().to_string(), "x42");
        let child = syntax.first_child().expect("inner node");
        assert_eq!(child.kind(), NodeKind::Symbol(SymbolId(257)));
        assert_eq!(child.parent().map(|p| p.kind()), Some(syntax.kind()));
        let tokens: Vec<_> = syntax
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .map(|token| token.kind())
            .collect();
        assert_eq!(
            tokens,
            vec![
                NodeKind::Token(TokenType::NAME),
                NodeKind::Token(TokenType::NUMBER)
            ]
        );
    }

    #[test]
    fn leaf_root_is_wrapped() {
        let leaf = PNode::leaf(Token::new(
            TokenType::NAME,
            "y",
            TextRange::new(0.into(), 1.into()),
        ));
        let syntax = leaf.to_syntax();
        assert_eq!(syntax.kind(), NodeKind::Token(TokenType::NAME));
        assert_eq!(syntax.text().to_string(), "y");
    }
}

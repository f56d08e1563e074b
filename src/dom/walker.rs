//! Token-stream view of a fragment, for the sanitizing filter chain.

use html5ever::{Attribute, QualName};

use super::{Fragment, NodeData, NodeId};

/// One step of a fragment in document order.
///
/// The sanitizer and any user-supplied [`TokenFilter`](crate::TokenFilter)s
/// operate on this stream before it is serialized back to a string.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Open {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Close {
        name: QualName,
    },
    Text(String),
    Comment(String),
}

enum Step {
    Enter(NodeId),
    Leave(QualName),
}

/// Depth-first iterator yielding [`Token`]s for the children of a scope
/// node; the scope itself is not reported.
pub(crate) struct TreeWalker<'a> {
    fragment: &'a Fragment,
    stack: Vec<Step>,
}

impl<'a> TreeWalker<'a> {
    pub(crate) fn new(fragment: &'a Fragment, scope: NodeId) -> Self {
        let stack = fragment
            .content_children(scope)
            .iter()
            .rev()
            .map(|&id| Step::Enter(id))
            .collect();
        Self { fragment, stack }
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            match self.stack.pop()? {
                Step::Leave(name) => return Some(Token::Close { name }),
                Step::Enter(id) => {
                    let Some(node) = self.fragment.get(id) else {
                        continue;
                    };
                    match &node.data {
                        NodeData::Document => {
                            for &child in self.fragment.children(id).iter().rev() {
                                self.stack.push(Step::Enter(child));
                            }
                        }
                        NodeData::Element { name, attrs, .. } => {
                            self.stack.push(Step::Leave(name.clone()));
                            for &child in self.fragment.content_children(id).iter().rev() {
                                self.stack.push(Step::Enter(child));
                            }
                            return Some(Token::Open {
                                name: name.clone(),
                                attrs: attrs.clone(),
                            });
                        }
                        NodeData::Text { contents } => return Some(Token::Text(contents.clone())),
                        NodeData::Comment { contents } => {
                            return Some(Token::Comment(contents.clone()))
                        }
                    }
                }
            }
        }
    }
}

//! Rendering back to strings through html5ever's serializer.

use std::io;

use html5ever::serialize::{HtmlSerializer, SerializeOpts, Serializer, TraversalScope};
use html5ever::{Attribute, QualName};

use super::walker::Token;
use super::{Fragment, NodeData, NodeId};

fn serializer_for(buf: &mut Vec<u8>) -> HtmlSerializer<&mut Vec<u8>> {
    HtmlSerializer::new(
        buf,
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            create_missing_parent: true,
            ..Default::default()
        },
    )
}

fn attr_refs<'a>(attrs: &'a [Attribute]) -> impl Iterator<Item = (&'a QualName, &'a str)> {
    attrs.iter().map(|a| (&a.name, &*a.value))
}

/// Renders a filtered token stream. Attribute order is taken as-is; the
/// sanitizer has already sorted what it kept.
pub(crate) fn render_tokens(tokens: &[Token]) -> String {
    let mut buf = Vec::new();
    if let Err(err) = write_tokens(&mut buf, tokens) {
        log::error!("serialize failed: {err}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_tokens(buf: &mut Vec<u8>, tokens: &[Token]) -> io::Result<()> {
    let mut ser = serializer_for(buf);
    for token in tokens {
        match token {
            Token::Open { name, attrs } => ser.start_elem(name.clone(), attr_refs(attrs))?,
            Token::Close { name } => ser.end_elem(name.clone())?,
            Token::Text(text) => ser.write_text(text)?,
            Token::Comment(text) => ser.write_comment(text)?,
        }
    }
    Ok(())
}

/// Renders the children of `scope` with every element's attributes sorted
/// by name, so linkified output is deterministic.
pub(crate) fn render_children(fragment: &Fragment, scope: NodeId) -> String {
    let mut buf = Vec::new();
    if let Err(err) = write_children(&mut buf, fragment, scope) {
        log::error!("serialize failed: {err}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

enum Op {
    Open(NodeId),
    Close(QualName),
}

fn write_children(buf: &mut Vec<u8>, fragment: &Fragment, scope: NodeId) -> io::Result<()> {
    let mut ser = serializer_for(buf);
    let mut stack: Vec<Op> = fragment
        .content_children(scope)
        .iter()
        .rev()
        .map(|&id| Op::Open(id))
        .collect();
    while let Some(op) = stack.pop() {
        match op {
            Op::Close(name) => ser.end_elem(name)?,
            Op::Open(id) => {
                let Some(node) = fragment.get(id) else {
                    continue;
                };
                match &node.data {
                    NodeData::Document => {
                        for &child in fragment.children(id).iter().rev() {
                            stack.push(Op::Open(child));
                        }
                    }
                    NodeData::Element { name, attrs, .. } => {
                        let mut sorted: Vec<&Attribute> = attrs.iter().collect();
                        sorted.sort_by(|a, b| a.name.local[..].cmp(&b.name.local[..]));
                        ser.start_elem(
                            name.clone(),
                            sorted.into_iter().map(|a| (&a.name, &*a.value)),
                        )?;
                        stack.push(Op::Close(name.clone()));
                        for &child in fragment.content_children(id).iter().rev() {
                            stack.push(Op::Open(child));
                        }
                    }
                    NodeData::Text { contents } => ser.write_text(contents)?,
                    NodeData::Comment { contents } => ser.write_comment(contents)?,
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::sink::parse_fragment_str;
    use crate::dom::walker::TreeWalker;

    fn roundtrip(html: &str) -> String {
        let fragment = parse_fragment_str(html);
        let tokens: Vec<Token> = TreeWalker::new(&fragment, fragment.root()).collect();
        render_tokens(&tokens)
    }

    #[test]
    fn tokens_roundtrip_simple_markup() {
        assert_eq!(roundtrip("a <b>c</b> d"), "a <b>c</b> d");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(roundtrip("an & entity"), "an &amp; entity");
        assert_eq!(roundtrip("a &lt;b&gt; c"), "a &lt;b&gt; c");
    }

    #[test]
    fn void_elements_get_no_end_tag() {
        assert_eq!(roundtrip("x<br>y"), "x<br>y");
    }

    #[test]
    fn children_render_sorts_attributes() {
        let fragment = parse_fragment_str("<a title=\"t\" href=\"/x\">y</a>");
        assert_eq!(
            render_children(&fragment, fragment.root()),
            "<a href=\"/x\" title=\"t\">y</a>"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let fragment = parse_fragment_str("<a href=\"/x?a=1&amp;b=2\">y</a>");
        assert_eq!(
            render_children(&fragment, fragment.root()),
            "<a href=\"/x?a=1&amp;b=2\">y</a>"
        );
    }

    #[test]
    fn comments_are_preserved_by_the_token_renderer() {
        assert_eq!(roundtrip("x<!-- note -->"), "x<!-- note -->");
    }
}

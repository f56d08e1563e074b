//! html5ever integration: fragment parsing into a [`Fragment`] arena.

use std::borrow::Cow;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink};
use html5ever::{parse_fragment, Attribute, ExpandedName, LocalName, ParseOpts, QualName};
use lazy_static::lazy_static;
use markup5ever::{local_name, namespace_url, ns};

use super::{Fragment, NodeData, NodeId};

lazy_static! {
    static ref EMPTY_NAME: QualName = QualName::new(None, ns!(), LocalName::from(""));
}

/// Tree builder sink that grows a [`Fragment`].
pub(crate) struct FragmentSink {
    fragment: Fragment,
}

impl FragmentSink {
    fn new() -> Self {
        Self {
            fragment: Fragment::new(),
        }
    }

    fn new_text_node(&mut self, text: &str) -> NodeId {
        self.fragment.create(NodeData::Text {
            contents: text.to_owned(),
        })
    }
}

impl TreeSink for FragmentSink {
    type Handle = NodeId;
    type Output = Fragment;

    fn finish(self) -> Fragment {
        self.fragment
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        log::debug!("parse error: {msg}");
    }

    fn get_document(&mut self) -> NodeId {
        self.fragment.document()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
        match self.fragment.element_name(*target) {
            Some(name) => name.expanded(),
            None => {
                log::debug!("element name queried for a non-element node");
                EMPTY_NAME.expanded()
            }
        }
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> NodeId {
        let template_contents = if flags.template {
            Some(self.fragment.create(NodeData::Document))
        } else {
            None
        };
        self.fragment.create(NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point: flags.mathml_annotation_xml_integration_point,
        })
    }

    fn create_comment(&mut self, text: StrTendril) -> NodeId {
        self.fragment.create(NodeData::Comment {
            contents: text.to_string(),
        })
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> NodeId {
        // The HTML tokenizer turns these into bogus comments before they
        // reach the sink; degrade the same way just in case.
        self.fragment.create(NodeData::Comment {
            contents: format!("?{target} {data}"),
        })
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(id) => self.fragment.append(*parent, id),
            NodeOrText::AppendText(text) => {
                if let Some(last) = self.fragment.last_child(*parent) {
                    if self.fragment.is_text(last) {
                        self.fragment.push_text(last, &text);
                        return;
                    }
                }
                let id = self.new_text_node(&text);
                self.fragment.append(*parent, id);
            }
        }
    }

    fn append_before_sibling(&mut self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        match new_node {
            NodeOrText::AppendNode(id) => self.fragment.insert_before(*sibling, id),
            NodeOrText::AppendText(text) => {
                if let Some(prev) = self.fragment.previous_sibling(*sibling) {
                    if self.fragment.is_text(prev) {
                        self.fragment.push_text(prev, &text);
                        return;
                    }
                }
                let id = self.new_text_node(&text);
                self.fragment.insert_before(*sibling, id);
            }
        }
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if self.fragment.parent_of(*element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Fragments carry no doctype.
    }

    fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
        if let Some(NodeData::Element {
            template_contents: Some(tc),
            ..
        }) = self.fragment.get(*target).map(|n| &n.data)
        {
            return *tc;
        }
        log::debug!("template contents queried for a non-template node");
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        log::debug!("quirks mode set to {mode:?}");
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
        if let Some(NodeData::Element {
            attrs: existing, ..
        }) = self.fragment.get_mut(*target).map(|n| &mut n.data)
        {
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.fragment.detach(*target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        self.fragment.reparent_children(*node, *new_parent);
    }

    fn is_mathml_annotation_xml_integration_point(&self, handle: &NodeId) -> bool {
        matches!(
            self.fragment.get(*handle).map(|n| &n.data),
            Some(NodeData::Element {
                mathml_annotation_xml_integration_point: true,
                ..
            })
        )
    }
}

fn opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Parses `html` as a fragment in a `<div>` context.
pub(crate) fn parse_fragment_str(html: &str) -> Fragment {
    let parser = parse_fragment(
        FragmentSink::new(),
        opts(),
        QualName::new(None, ns!(html), local_name!("div")),
        Vec::new(),
    );
    parser.one(StrTendril::from_slice(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_markup() {
        let fragment = parse_fragment_str("a <b>c</b> d");
        let root = fragment.root();
        let kids = fragment.children(root);
        assert_eq!(kids.len(), 3);
        assert_eq!(fragment.text_contents(kids[0]), Some("a "));
        assert!(fragment.is_html_element(kids[1], &local_name!("b")));
        assert_eq!(fragment.text_contents(kids[2]), Some(" d"));
    }

    #[test]
    fn adjacent_text_is_merged() {
        let fragment = parse_fragment_str("one &amp; two");
        let root = fragment.root();
        let kids = fragment.children(root);
        assert_eq!(kids.len(), 1);
        assert_eq!(fragment.text_contents(kids[0]), Some("one & two"));
    }

    #[test]
    fn foster_parented_text_lands_before_the_table() {
        let fragment = parse_fragment_str("<table>test</table>");
        let root = fragment.root();
        let kids = fragment.children(root);
        assert_eq!(kids.len(), 2);
        assert_eq!(fragment.text_contents(kids[0]), Some("test"));
        assert!(fragment.is_html_element(kids[1], &local_name!("table")));
    }

    #[test]
    fn comments_become_comment_nodes() {
        let fragment = parse_fragment_str("x<!-- note -->y");
        let root = fragment.root();
        let kids = fragment.children(root);
        assert_eq!(kids.len(), 3);
        assert!(matches!(
            fragment.get(kids[1]).map(|n| &n.data),
            Some(NodeData::Comment { contents }) if contents == " note "
        ));
    }

    #[test]
    fn unterminated_bogus_end_tag_is_a_comment() {
        let fragment = parse_fragment_str("</3");
        let root = fragment.root();
        let kids = fragment.children(root);
        assert_eq!(kids.len(), 1);
        assert!(matches!(
            fragment.get(kids[0]).map(|n| &n.data),
            Some(NodeData::Comment { .. })
        ));
    }

    #[test]
    fn template_contents_live_in_their_own_subtree() {
        let fragment = parse_fragment_str("<template><i>t</i></template>");
        let root = fragment.root();
        let template = fragment.children(root)[0];
        assert!(fragment.children(template).is_empty());
        let contents = fragment.content_children(template);
        assert_eq!(contents.len(), 1);
        assert!(fragment.is_html_element(contents[0], &local_name!("i")));
    }
}

//! Turning plain URLs and email addresses into anchors.
//!
//! The [`Linker`] parses a fragment, walks its tree with an explicit
//! stack, rewrites matching text nodes into markup and splices the
//! parsed replacement back into place. Anchors it creates or accepts
//! are remembered so a later pass over spliced text cannot visit them
//! again.

use std::collections::HashSet;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName};
use markup5ever::{local_name, namespace_url, ns};

use crate::callbacks::{apply_callbacks, default_callbacks, Callback, LinkAttributes};
use crate::dom::serializer::render_children;
use crate::dom::sink::parse_fragment_str;
use crate::dom::{Fragment, NodeData, NodeId};
use crate::errors::{Error, Result};

mod matcher;

/// Elements nested deeper than this abort the walk; whatever was
/// already rewritten still gets rendered.
const MAX_DEPTH: usize = 256;

#[derive(Clone, Copy)]
struct Frame {
    node: NodeId,
    index: usize,
    parse_text: bool,
}

/// Reusable autolinker.
///
/// ```
/// use lye::Linker;
///
/// let linker = Linker::new().callbacks(Vec::new());
/// assert_eq!(
///     linker.linkify("go to example.com"),
///     "go to <a href=\"http://example.com\">example.com</a>",
/// );
/// ```
pub struct Linker {
    callbacks: Vec<Callback>,
    skip_pre: bool,
    parse_email: bool,
}

impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}

impl Linker {
    pub fn new() -> Self {
        Self {
            callbacks: default_callbacks(),
            skip_pre: false,
            parse_email: false,
        }
    }

    /// Replaces the callback chain run on every candidate link.
    pub fn callbacks(mut self, callbacks: Vec<Callback>) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Leave text inside `<pre>` alone.
    pub fn skip_pre(mut self, skip_pre: bool) -> Self {
        self.skip_pre = skip_pre;
        self
    }

    /// Also link email addresses as `mailto:` anchors.
    pub fn parse_email(mut self, parse_email: bool) -> Self {
        self.parse_email = parse_email;
        self
    }

    /// Links URLs (and optionally email addresses) in `text`.
    pub fn linkify(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let mut fragment = parse_fragment_str(text);
        let mut seen = HashSet::new();
        if let Err(err) = self.walk(&mut fragment, &mut seen) {
            log::error!("link pass gave up early: {err}");
        }
        render_children(&fragment, fragment.root())
    }

    fn walk(&self, fragment: &mut Fragment, seen: &mut HashSet<NodeId>) -> Result<()> {
        let mut stack = vec![Frame {
            node: fragment.root(),
            index: 0,
            parse_text: true,
        }];
        while let Some(&frame) = stack.last() {
            let Some(child) = fragment.child_at(frame.node, frame.index) else {
                stack.pop();
                continue;
            };

            if fragment.is_text(child) {
                let resume = if frame.parse_text {
                    self.replace_text(fragment, frame.node, frame.index, seen)
                } else {
                    None
                };
                if let Some(top) = stack.last_mut() {
                    top.index = resume.unwrap_or(frame.index + 1);
                }
                continue;
            }

            if fragment.element_name(child).is_none() || seen.contains(&child) {
                if let Some(top) = stack.last_mut() {
                    top.index += 1;
                }
                continue;
            }

            if fragment.is_html_element(child, &local_name!("a")) {
                // Anchors without an href are left alone entirely.
                let resume = if fragment.attribute(child, "href").is_some() {
                    self.process_existing_link(fragment, frame.node, frame.index, child, seen)
                } else {
                    None
                };
                if let Some(top) = stack.last_mut() {
                    top.index = resume.unwrap_or(frame.index + 1);
                }
                continue;
            }

            let parse_text = frame.parse_text
                && !(self.skip_pre && fragment.is_html_element(child, &local_name!("pre")));
            if let Some(top) = stack.last_mut() {
                top.index += 1;
            }
            if stack.len() >= MAX_DEPTH {
                return Err(Error::DepthLimit(MAX_DEPTH));
            }
            stack.push(Frame {
                node: fragment.content_holder(child),
                index: 0,
                parse_text,
            });
        }
        Ok(())
    }

    /// Rewrites the text node at `parent[index]`. Returns the index to
    /// rescan from when a substitution was spliced in.
    fn replace_text(
        &self,
        fragment: &mut Fragment,
        parent: NodeId,
        index: usize,
        seen: &mut HashSet<NodeId>,
    ) -> Option<usize> {
        let child = fragment.child_at(parent, index)?;
        let text = fragment.text_contents(child)?.to_owned();
        let replaced = if self.parse_email {
            self.substitute_emails(&text)
                .or_else(|| self.substitute_links(&text))
        } else {
            self.substitute_links(&text)
        }?;
        Some(self.splice_markup(fragment, parent, index, 1, &replaced, seen))
    }

    fn substitute_links(&self, text: &str) -> Option<String> {
        let mut out = String::new();
        let mut last = 0;
        for span in matcher::find_links(text) {
            out.push_str(&text[last..span.start]);
            out.push_str(&self.link_replacement(&text[span.clone()]));
            last = span.end;
        }
        out.push_str(&text[last..]);
        (out != text).then_some(out)
    }

    fn substitute_emails(&self, text: &str) -> Option<String> {
        let mut out = String::new();
        let mut last = 0;
        for span in matcher::find_emails(text) {
            out.push_str(&text[last..span.start]);
            out.push_str(&self.email_replacement(&text[span.clone()]));
            last = span.end;
        }
        out.push_str(&text[last..]);
        (out != text).then_some(out)
    }

    /// Builds the markup replacing one URL match. A veto reproduces the
    /// matched text exactly, stripped punctuation included.
    fn link_replacement(&self, matched: &str) -> String {
        let (mut body, open, mut close) = if matched.starts_with('(') {
            matcher::strip_wrapping_parentheses(matched)
        } else {
            (matched, 0, 0)
        };
        // A trailing run of ) with no ( anywhere in the URL belongs to
        // the surrounding text.
        if body.ends_with(')') && !body.contains('(') {
            let stripped = body.trim_end_matches(')');
            close += body.len() - stripped.len();
            body = stripped;
        }
        let (url, end) = matcher::split_trailing_punctuation(body);
        let href = if matcher::has_scheme(url) {
            url.to_owned()
        } else {
            format!("http://{url}")
        };

        let mut attrs = LinkAttributes::new(url);
        attrs.set("href", href);
        let anchor = match apply_callbacks(&self.callbacks, attrs, true) {
            Some(link) if link.contains("href") => build_anchor(&link),
            Some(_) => {
                log::warn!("callback removed href from a new link, leaving text bare");
                url.to_owned()
            }
            None => url.to_owned(),
        };
        format!(
            "{}{}{}{}",
            "(".repeat(open),
            anchor,
            end,
            ")".repeat(close)
        )
    }

    /// Builds the markup replacing one email match.
    fn email_replacement(&self, matched: &str) -> String {
        let mut attrs = LinkAttributes::new(matched);
        attrs.set("href", format!("mailto:{matched}"));
        match apply_callbacks(&self.callbacks, attrs, true) {
            Some(link) => build_anchor(&link),
            None => matched.to_owned(),
        }
    }

    /// Runs an already-present anchor through the callback chain.
    /// Returns the index to rescan from when the anchor was unwrapped.
    fn process_existing_link(
        &self,
        fragment: &mut Fragment,
        parent: NodeId,
        index: usize,
        anchor: NodeId,
        seen: &mut HashSet<NodeId>,
    ) -> Option<usize> {
        let inner = render_children(fragment, anchor);
        let mut attrs = LinkAttributes::new(inner.as_str());
        if let Some(NodeData::Element {
            attrs: existing, ..
        }) = fragment.get(anchor).map(|n| &n.data)
        {
            for attr in existing {
                attrs.set(&attr.name.local[..], &attr.value[..]);
            }
        }

        match apply_callbacks(&self.callbacks, attrs, false) {
            None => Some(self.splice_markup(fragment, parent, index, 1, &inner, seen)),
            Some(link) => {
                let new_attrs = link
                    .iter()
                    .map(|(name, value)| Attribute {
                        name: QualName::new(None, ns!(), LocalName::from(name)),
                        value: StrTendril::from_slice(value),
                    })
                    .collect();
                fragment.set_attributes(anchor, new_attrs);
                if link.text != inner {
                    for child in fragment.children(anchor).to_vec() {
                        fragment.remove_subtree(child);
                    }
                    let sub = parse_fragment_str(&link.text);
                    for id in fragment.graft_children(&sub, sub.root()) {
                        fragment.append(anchor, id);
                    }
                }
                seen.insert(anchor);
                None
            }
        }
    }

    /// Parses `html` and splices the result over `remove` children of
    /// `parent` at `index`. New top-level anchors are marked as seen.
    fn splice_markup(
        &self,
        fragment: &mut Fragment,
        parent: NodeId,
        index: usize,
        remove: usize,
        html: &str,
        seen: &mut HashSet<NodeId>,
    ) -> usize {
        let sub = parse_fragment_str(html);
        let ids = fragment.graft_children(&sub, sub.root());
        for &id in &ids {
            if fragment.is_html_element(id, &local_name!("a")) {
                seen.insert(id);
            }
        }
        fragment.splice_children(parent, index, remove, ids)
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Serializes a callback-approved link as anchor markup. The text is
/// emitted raw; it gets reparsed along with the rest of the
/// substitution.
fn build_anchor(link: &LinkAttributes) -> String {
    let mut out = String::from("<a");
    for (name, value) in link.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');
    out.push_str(&link.text);
    out.push_str("</a>");
    out
}

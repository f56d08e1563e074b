//! Arena-backed fragment tree.
//!
//! Parsed markup lives in a [`Fragment`]: a flat arena of nodes addressed by
//! [`NodeId`], with parent/child links stored per node. The linkifier edits
//! the tree in place; the sanitizer only walks it as a token stream.

use std::collections::{HashMap, VecDeque};

use html5ever::{Attribute, LocalName, QualName};
use markup5ever::{namespace_url, ns};

pub mod serializer;
pub mod sink;
pub mod walker;

/// Identifier of a node inside a [`Fragment`] arena.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl NodeId {
    pub(crate) fn root() -> Self {
        Self(0)
    }

    pub(crate) fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// Payload of a single node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    /// Container node produced by the fragment parser; never serialized.
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Parsed `<template>` contents live in their own container node.
        template_contents: Option<NodeId>,
        mathml_annotation_xml_integration_point: bool,
    },
    Text {
        contents: String,
    },
    Comment {
        contents: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

/// A parsed HTML fragment.
#[derive(Clone, Debug)]
pub struct Fragment {
    nodes: HashMap<NodeId, Node>,
    next_id: NodeId,
    document: NodeId,
}

impl Default for Fragment {
    fn default() -> Self {
        Self::new()
    }
}

impl Fragment {
    pub fn new() -> Self {
        let document = NodeId::root();
        let mut nodes = HashMap::new();
        nodes.insert(
            document,
            Node {
                id: document,
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            },
        );
        Self {
            nodes,
            next_id: document.next(),
            document,
        }
    }

    pub(crate) fn document(&self) -> NodeId {
        self.document
    }

    /// The element the fragment parser wrapped the parsed content in, or the
    /// document node for an empty arena.
    pub(crate) fn root(&self) -> NodeId {
        self.children(self.document)
            .iter()
            .copied()
            .find(|&c| matches!(self.get(c).map(|n| &n.data), Some(NodeData::Element { .. })))
            .unwrap_or(self.document)
    }

    pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.next_id;
        self.next_id = id.next();
        self.nodes.insert(
            id,
            Node {
                id,
                parent: None,
                children: Vec::new(),
                data,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub(crate) fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    #[cfg(test)]
    pub(crate) fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).len()
    }

    pub(crate) fn last_child(&self, parent: NodeId) -> Option<NodeId> {
        self.children(parent).last().copied()
    }

    pub(crate) fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }

    /// Children to descend into: a template's parsed contents, everyone
    /// else's child list.
    pub(crate) fn content_children(&self, id: NodeId) -> &[NodeId] {
        if let Some(NodeData::Element {
            template_contents: Some(tc),
            ..
        }) = self.get(id).map(|n| &n.data)
        {
            return self.children(*tc);
        }
        self.children(id)
    }

    /// Node whose child list holds `id`'s content: the contents container
    /// for a template, `id` itself otherwise.
    pub(crate) fn content_holder(&self, id: NodeId) -> NodeId {
        if let Some(NodeData::Element {
            template_contents: Some(tc),
            ..
        }) = self.get(id).map(|n| &n.data)
        {
            return *tc;
        }
        id
    }

    pub(crate) fn element_name(&self, id: NodeId) -> Option<&QualName> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn is_html_element(&self, id: NodeId, local: &LocalName) -> bool {
        self.element_name(id)
            .is_some_and(|name| name.ns == ns!(html) && name.local == *local)
    }

    pub(crate) fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Text { .. }))
    }

    pub(crate) fn text_contents(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text { contents } => Some(contents),
            _ => None,
        }
    }

    pub(crate) fn push_text(&mut self, id: NodeId, more: &str) {
        if let Some(NodeData::Text { contents }) = self.get_mut(id).map(|n| &mut n.data) {
            contents.push_str(more);
        }
    }

    pub(crate) fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local[..].eq_ignore_ascii_case(name))
                .map(|a| &*a.value),
            _ => None,
        }
    }

    pub(crate) fn set_attributes(&mut self, id: NodeId, new_attrs: Vec<Attribute>) {
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            *attrs = new_attrs;
        }
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent_of(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(&parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if !self.nodes.contains_key(&parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            let at = index.min(node.children.len());
            node.children.insert(at, child);
        }
    }

    pub(crate) fn insert_before(&mut self, sibling: NodeId, new_id: NodeId) {
        let Some(parent) = self.parent_of(sibling) else {
            log::debug!("insert_before target has no parent, dropping node");
            return;
        };
        let Some(index) = self.children(parent).iter().position(|&c| c == sibling) else {
            return;
        };
        self.insert_child_at(parent, index, new_id);
    }

    pub(crate) fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let moved = self
            .nodes
            .get_mut(&from)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for id in moved {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = None;
            }
            self.append(to, id);
        }
    }

    /// Detaches `id` and deletes its whole subtree from the arena,
    /// template contents included.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        self.detach(id);
        let mut work = vec![id];
        while let Some(current) = work.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                work.extend(node.children);
                if let NodeData::Element {
                    template_contents: Some(tc),
                    ..
                } = node.data
                {
                    work.push(tc);
                }
            }
        }
    }

    /// Merges `right` into `left` when both are text nodes. `right` is
    /// deleted on success.
    fn merge_adjacent_text(&mut self, left: NodeId, right: NodeId) -> bool {
        if !self.is_text(left) {
            return false;
        }
        let Some(tail) = self.text_contents(right).map(str::to_owned) else {
            return false;
        };
        self.push_text(left, &tail);
        self.remove_subtree(right);
        true
    }

    /// Replaces `remove` children of `parent` starting at `index` with
    /// `new_ids`, coalescing text nodes at both boundaries. Returns the
    /// index the caller should rescan from.
    pub(crate) fn splice_children(
        &mut self,
        parent: NodeId,
        index: usize,
        remove: usize,
        new_ids: Vec<NodeId>,
    ) -> usize {
        for _ in 0..remove {
            let Some(&victim) = self.children(parent).get(index) else {
                break;
            };
            self.remove_subtree(victim);
        }
        for (offset, &id) in new_ids.iter().enumerate() {
            self.insert_child_at(parent, index + offset, id);
        }
        if !new_ids.is_empty() {
            let right = index + new_ids.len();
            let pair = (self.child_at(parent, right - 1), self.child_at(parent, right));
            if let (Some(a), Some(b)) = pair {
                self.merge_adjacent_text(a, b);
            }
        }
        if index > 0 {
            let pair = (self.child_at(parent, index - 1), self.child_at(parent, index));
            if let (Some(a), Some(b)) = pair {
                if self.merge_adjacent_text(a, b) {
                    return index - 1;
                }
            }
        }
        index
    }

    /// Deep-copies every child of `src_parent` in `src` into this arena.
    /// The copies are left unparented; the returned ids preserve order.
    pub(crate) fn graft_children(&mut self, src: &Fragment, src_parent: NodeId) -> Vec<NodeId> {
        let mut roots = Vec::new();
        let mut queue: VecDeque<(NodeId, Option<NodeId>)> = src
            .children(src_parent)
            .iter()
            .map(|&c| (c, None))
            .collect();
        while let Some((src_id, dst_parent)) = queue.pop_front() {
            let Some(src_node) = src.get(src_id) else {
                continue;
            };
            let mut data = src_node.data.clone();
            let mut src_contents = None;
            if let NodeData::Element {
                template_contents, ..
            } = &mut data
            {
                src_contents = template_contents.take();
            }
            let new_id = self.create(data);
            match dst_parent {
                Some(parent) => self.append(parent, new_id),
                None => roots.push(new_id),
            }
            if let Some(tc) = src_contents {
                let container = self.create(NodeData::Document);
                if let Some(NodeData::Element {
                    template_contents, ..
                }) = self.get_mut(new_id).map(|n| &mut n.data)
                {
                    *template_contents = Some(container);
                }
                for &grandchild in src.children(tc) {
                    queue.push_back((grandchild, Some(container)));
                }
            }
            for &child in src.children(src_id) {
                queue.push_back((child, Some(new_id)));
            }
        }
        roots
    }
}

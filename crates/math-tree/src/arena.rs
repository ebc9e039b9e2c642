use std::mem;
use std::num::NonZero;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::attribute::{Attr, PropValue, Property};
use crate::builder::TreeBuilder;
use crate::kind::{Arity, NodeKind};

/// A reference to a node in an [`Arena`].
///
/// The index is stored off by one, so that `Option<NodeId>` has the same size as `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(transparent)]
pub struct NodeId(NonZero<u32>);

static_assertions::assert_eq_size!(Option<NodeId>, u32);

impl NodeId {
    #[inline]
    fn from_index(index: usize) -> Self {
        NodeId(NonZero::<u32>::MIN.saturating_add(index as u32))
    }

    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    attributes: Vec<(Attr, Box<str>)>,
    properties: Vec<(Property, PropValue)>,
    text: Option<Box<str>>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            children: Vec::new(),
            parent: None,
            attributes: Vec::new(),
            properties: Vec::new(),
            text: None,
        }
    }
}

/// Owns all nodes of one or more trees. Nodes are never freed individually.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    nodes: Vec<NodeData>,
}

impl Arena {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    /// Number of nodes allocated so far, including detached ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(data);
        id
    }

    #[inline]
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// The implicit row owned by nodes of arity [`Arity::InferredRow`].
    fn inferred_row(&self, owner: NodeId) -> Option<NodeId> {
        self.node(owner).children.first().copied()
    }
}

impl TreeBuilder for Arena {
    fn create_node(
        &mut self,
        kind: NodeKind,
        children: &[NodeId],
        attributes: &[(Attr, &str)],
        text: Option<&str>,
    ) -> NodeId {
        let node = self.push(NodeData::new(kind));
        if matches!(kind.arity(), Arity::InferredRow) {
            let mut row = NodeData::new(NodeKind::Mrow);
            row.properties.push((Property::Inferred, PropValue::Bool(true)));
            let row = self.push(row);
            self.attach(node, row);
        }
        for &(attr, value) in attributes {
            self.set_attribute(node, attr, value);
        }
        if let Some(text) = text
            && kind.is_token()
        {
            let leaf = self.create_text(text);
            self.attach(node, leaf);
        }
        for &child in children {
            self.append_child(node, child);
        }
        node
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text);
        data.text = Some(text.into());
        self.push(data)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        match self.node(parent).kind.arity() {
            Arity::InferredRow => {
                if let Some(row) = self.inferred_row(parent) {
                    self.append_child(row, child);
                }
            }
            Arity::Unbounded => {
                if self.is_inferred(child) {
                    let grandchildren = mem::take(&mut self.node_mut(child).children);
                    for grandchild in grandchildren {
                        self.attach(parent, grandchild);
                    }
                } else {
                    self.attach(parent, child);
                }
            }
            Arity::Fixed(_) => {
                if self.is_inferred(child) {
                    self.remove_property(child, Property::Inferred);
                }
                self.attach(parent, child);
            }
            Arity::Token => {
                if self.node(child).kind == NodeKind::Text {
                    self.attach(parent, child);
                }
            }
            Arity::Leaf => {}
        }
    }

    fn set_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let target = match self.node(parent).kind.arity() {
            Arity::InferredRow => self.inferred_row(parent).unwrap_or(parent),
            _ => parent,
        };
        for old in mem::take(&mut self.node_mut(target).children) {
            self.node_mut(old).parent = None;
        }
        for &child in children {
            self.append_child(target, child);
        }
    }

    #[inline]
    fn get_children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    #[inline]
    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    #[inline]
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        let data = self.node(node);
        if data.kind == NodeKind::Text {
            return data.text.as_deref();
        }
        let leaf = data.children.first()?;
        self.node(*leaf).text.as_deref()
    }

    fn append_text(&mut self, node: NodeId, text: &str) {
        let target = if self.node(node).kind == NodeKind::Text {
            node
        } else if let Some(&leaf) = self.node(node).children.first() {
            leaf
        } else {
            let leaf = self.create_text("");
            self.append_child(node, leaf);
            leaf
        };
        let data = self.node_mut(target);
        let mut joined = data.text.take().map(String::from).unwrap_or_default();
        joined.push_str(text);
        data.text = Some(joined.into_boxed_str());
    }

    fn set_attribute(&mut self, node: NodeId, attr: Attr, value: &str) {
        let attributes = &mut self.node_mut(node).attributes;
        if let Some(slot) = attributes.iter_mut().find(|(name, _)| *name == attr) {
            slot.1 = value.into();
        } else {
            attributes.push((attr, value.into()));
        }
    }

    fn get_attribute(&self, node: NodeId, attr: Attr) -> Option<&str> {
        self.node(node)
            .attributes
            .iter()
            .find(|(name, _)| *name == attr)
            .map(|(_, value)| &**value)
    }

    fn remove_attribute(&mut self, node: NodeId, attr: Attr) {
        self.node_mut(node).attributes.retain(|(name, _)| *name != attr);
    }

    #[inline]
    fn attributes(&self, node: NodeId) -> &[(Attr, Box<str>)] {
        &self.node(node).attributes
    }

    fn set_property(&mut self, node: NodeId, prop: Property, value: PropValue) {
        let properties = &mut self.node_mut(node).properties;
        if let Some(slot) = properties.iter_mut().find(|(name, _)| *name == prop) {
            slot.1 = value;
        } else {
            properties.push((prop, value));
        }
    }

    fn get_property(&self, node: NodeId, prop: Property) -> Option<&PropValue> {
        self.node(node)
            .properties
            .iter()
            .find(|(name, _)| *name == prop)
            .map(|(_, value)| value)
    }

    fn remove_property(&mut self, node: NodeId, prop: Property) {
        self.node_mut(node).properties.retain(|(name, _)| *name != prop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::TexClass;
    use crate::fmt::dump;

    #[test]
    fn math_owns_inferred_row() {
        let mut arena = Arena::new();
        let x = arena.create_node(NodeKind::Mi, &[], &[], Some("x"));
        let math = arena.create_node(NodeKind::Math, &[x], &[], None);
        let children = arena.get_children(math);
        assert_eq!(children.len(), 1);
        assert!(arena.is_inferred(children[0]));
        assert_eq!(arena.get_children(children[0]), &[x]);
        assert_eq!(arena.parent(x), Some(children[0]));
    }

    #[test]
    fn inferred_row_is_spliced_into_row() {
        let mut arena = Arena::new();
        let a = arena.create_node(NodeKind::Mi, &[], &[], Some("a"));
        let b = arena.create_node(NodeKind::Mi, &[], &[], Some("b"));
        let sqrt = arena.create_node(NodeKind::Msqrt, &[a, b], &[], None);
        let inner = arena.get_children(sqrt)[0];
        let row = arena.create_node(NodeKind::Mrow, &[inner], &[], None);
        assert_eq!(arena.get_children(row), &[a, b]);
    }

    #[test]
    fn inferred_row_below_fixed_arity_becomes_plain_row() {
        let mut arena = Arena::new();
        let a = arena.create_node(NodeKind::Mi, &[], &[], Some("a"));
        let b = arena.create_node(NodeKind::Mi, &[], &[], Some("b"));
        let c = arena.create_node(NodeKind::Mi, &[], &[], Some("c"));
        let style = arena.create_node(NodeKind::Mstyle, &[a, b], &[], None);
        let num = arena.get_children(style)[0];
        let frac = arena.create_node(NodeKind::Mfrac, &[num, c], &[], None);
        assert!(!arena.is_inferred(num));
        assert_eq!(dump(&arena, frac), r#"mfrac(mrow(mi"a" mi"b") mi"c")"#);
    }

    #[test]
    fn copy_attributes_is_deep() {
        let mut arena = Arena::new();
        let from = arena.create_node(NodeKind::Mo, &[], &[(Attr::Stretchy, "true")], Some("("));
        let to = arena.create_node(NodeKind::Mo, &[], &[(Attr::Fence, "false")], Some(")"));
        arena.copy_attributes(from, to);
        assert_eq!(arena.attributes(to), arena.attributes(from));
        arena.set_attribute(from, Attr::Stretchy, "false");
        arena.set_attribute(from, Attr::Symmetric, "true");
        assert_eq!(arena.get_attribute(to, Attr::Stretchy), Some("true"));
        assert_eq!(arena.get_attribute(to, Attr::Symmetric), None);
        assert_eq!(arena.get_attribute(to, Attr::Fence), None);
    }

    #[test]
    fn core_of_embellished_operator() {
        let mut arena = Arena::new();
        let sum = arena.create_node(NodeKind::Mo, &[], &[], Some("∑"));
        arena.set_tex_class(sum, TexClass::Op);
        let i = arena.create_node(NodeKind::Mi, &[], &[], Some("i"));
        let under = arena.create_node(NodeKind::Munder, &[sum, i], &[], None);
        let style = arena.create_node(NodeKind::Mstyle, &[under], &[], None);
        assert!(arena.is_embellished(style));
        assert_eq!(arena.core(under), sum);
        assert_eq!(arena.core_mo(style), sum);
        assert_eq!(arena.tex_class(style), TexClass::Op);

        let x = arena.create_node(NodeKind::Mi, &[], &[], Some("x"));
        assert!(!arena.is_embellished(x));
        assert_eq!(arena.core(x), x);
        assert_eq!(arena.core_mo(x), x);
    }

    #[test]
    fn row_with_space_is_still_embellished() {
        let mut arena = Arena::new();
        let plus = arena.create_node(NodeKind::Mo, &[], &[], Some("+"));
        let space = arena.create_node(NodeKind::Mspace, &[], &[(Attr::Width, "1em")], None);
        let row = arena.create_node(NodeKind::Mrow, &[space, plus], &[], None);
        assert!(arena.is_embellished(row));
        assert_eq!(arena.core(row), plus);
        let other = arena.create_node(NodeKind::Mi, &[], &[], Some("y"));
        arena.append_child(row, other);
        assert!(!arena.is_embellished(row));
    }

    #[test]
    fn append_text_extends_token() {
        let mut arena = Arena::new();
        let lt = arena.create_node(NodeKind::Mo, &[], &[], Some("<"));
        arena.append_text(lt, "<");
        assert_eq!(arena.text(lt), Some("<<"));
    }
}

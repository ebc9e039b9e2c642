use crate::arena::NodeId;
use crate::attribute::{Attr, PropValue, Property, TexClass};
use crate::kind::NodeKind;

/// The node construction and inspection capability used by the TeX parser.
///
/// [`Arena`](crate::arena::Arena) is the default implementation. The required methods are plain
/// storage operations; the provided methods encode the structural rules (embellishment, cores,
/// class inheritance) and should normally not be overridden.
pub trait TreeBuilder {
    /// Create a node of the given kind.
    ///
    /// Children are appended with the same rules as [`TreeBuilder::append_child`]. For token
    /// kinds, `text` becomes a single text leaf below the new node.
    fn create_node(
        &mut self,
        kind: NodeKind,
        children: &[NodeId],
        attributes: &[(Attr, &str)],
        text: Option<&str>,
    ) -> NodeId;

    /// Create a bare text leaf.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Append a child, respecting the arity of the parent:
    /// inferred rows are spliced into rows, converted to plain rows below fixed-arity nodes,
    /// and nodes that own an inferred row receive the child in that row.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Replace all children of `parent`.
    fn set_children(&mut self, parent: NodeId, children: &[NodeId]);

    fn get_children(&self, node: NodeId) -> &[NodeId];

    fn kind(&self, node: NodeId) -> NodeKind;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// The text of a text leaf, or of the first text leaf of a token node.
    fn text(&self, node: NodeId) -> Option<&str>;

    /// Append to the text of a token node (or a text leaf).
    fn append_text(&mut self, node: NodeId, text: &str);

    fn set_attribute(&mut self, node: NodeId, attr: Attr, value: &str);

    fn get_attribute(&self, node: NodeId, attr: Attr) -> Option<&str>;

    fn remove_attribute(&mut self, node: NodeId, attr: Attr);

    /// All explicitly set attributes, in the order they were first set.
    fn attributes(&self, node: NodeId) -> &[(Attr, Box<str>)];

    fn set_property(&mut self, node: NodeId, prop: Property, value: PropValue);

    fn get_property(&self, node: NodeId, prop: Property) -> Option<&PropValue>;

    fn remove_property(&mut self, node: NodeId, prop: Property);

    /// Make `to` carry exactly the attributes of `from`.
    ///
    /// The values are cloned, so later changes to `from` are not visible through `to`.
    fn copy_attributes(&mut self, from: NodeId, to: NodeId) {
        let source: Vec<(Attr, Box<str>)> = self.attributes(from).to_vec();
        let stale: Vec<Attr> = self.attributes(to).iter().map(|(attr, _)| *attr).collect();
        for attr in stale {
            self.remove_attribute(to, attr);
        }
        for (attr, value) in source {
            self.set_attribute(to, attr, &value);
        }
    }

    #[inline]
    fn is_kind(&self, node: NodeId, kind: NodeKind) -> bool {
        self.kind(node) == kind
    }

    #[inline]
    fn has_flag(&self, node: NodeId, prop: Property) -> bool {
        self.get_property(node, prop).is_some_and(PropValue::as_bool)
    }

    #[inline]
    fn is_inferred(&self, node: NodeId) -> bool {
        self.has_flag(node, Property::Inferred)
    }

    /// Nodes that take up room but have no visible content of their own.
    fn is_spacelike(&self, node: NodeId) -> bool {
        match self.kind(node) {
            NodeKind::Mspace | NodeKind::Mtext => true,
            NodeKind::Mrow
            | NodeKind::Mstyle
            | NodeKind::Mphantom
            | NodeKind::Mpadded
            | NodeKind::TeXAtom => self
                .get_children(node)
                .iter()
                .all(|&child| self.is_spacelike(child)),
            _ => false,
        }
    }

    /// An operator, possibly wrapped in scripts, limits or layout nodes.
    fn is_embellished(&self, node: NodeId) -> bool {
        let kind = self.kind(node);
        if kind == NodeKind::Mo {
            true
        } else if kind.is_script_base() || kind.is_layout() {
            self.get_children(node)
                .first()
                .is_some_and(|&base| self.is_embellished(base))
        } else if kind == NodeKind::Mrow {
            self.embellished_row_core(node).is_some()
        } else {
            false
        }
    }

    /// The only non-spacelike child of a row, if it is embellished.
    fn embellished_row_core(&self, row: NodeId) -> Option<NodeId> {
        let mut core = None;
        for &child in self.get_children(row) {
            if self.is_spacelike(child) {
                continue;
            }
            if core.is_some() {
                return None;
            }
            core = Some(child);
        }
        core.filter(|&child| self.is_embellished(child))
    }

    /// Strip one level of embellishment.
    ///
    /// Returns the node itself if it is not embellished or is an `mo`.
    fn core(&self, node: NodeId) -> NodeId {
        if !self.is_embellished(node) {
            return node;
        }
        let kind = self.kind(node);
        if kind.is_script_base() || kind.is_layout() {
            self.get_children(node).first().copied().unwrap_or(node)
        } else if kind == NodeKind::Mrow {
            self.embellished_row_core(node).unwrap_or(node)
        } else {
            node
        }
    }

    /// The `mo` at the bottom of an embellished operator, or the node itself.
    fn core_mo(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while !self.is_kind(current, NodeKind::Mo) && self.is_embellished(current) {
            let next = self.core(current);
            if next == current {
                break;
            }
            current = next;
        }
        if self.is_kind(current, NodeKind::Mo) {
            current
        } else {
            node
        }
    }

    /// The explicit TeX class of a node, or the one it inherits from its core operator.
    fn tex_class(&self, node: NodeId) -> TexClass {
        if let Some(PropValue::Class(class)) = self.get_property(node, Property::TexClass) {
            return *class;
        }
        match self.kind(node) {
            NodeKind::Mspace => TexClass::None,
            NodeKind::Mo => TexClass::Ord,
            _ => {
                let core = self.core_mo(node);
                if core != node {
                    self.tex_class(core)
                } else {
                    TexClass::Ord
                }
            }
        }
    }

    #[inline]
    fn set_tex_class(&mut self, node: NodeId, class: TexClass) {
        self.set_property(node, Property::TexClass, PropValue::Class(class));
    }
}

//! Clean-up passes over a finished tree: merging adjacent relations and the TeX spacing classes.

use math_tree::{Attr, NodeId, NodeKind, PropValue, Property, TexClass, TreeBuilder};

/// Run all passes on the subtree below `node`.
pub(crate) fn clean_tree<B: TreeBuilder + ?Sized>(builder: &mut B, node: NodeId) {
    let kind = builder.kind(node);
    if kind.is_token() || matches!(kind, NodeKind::Text | NodeKind::Mspace) {
        return;
    }
    if kind == NodeKind::Mrow {
        combine_relations(builder, node);
        adjust_row(builder, node);
    } else if kind.is_script_base() || kind == NodeKind::Mroot {
        // The base of a script takes part in the row around it; everything else stands alone.
        let skip = usize::from(kind.is_script_base() && kind != NodeKind::Mfrac);
        let children = builder.get_children(node).to_vec();
        for &child in children.iter().skip(skip) {
            if builder.tex_class(child) == TexClass::Bin {
                set_class(builder, child, TexClass::Ord);
            }
        }
    }
    let children = builder.get_children(node).to_vec();
    for child in children {
        clean_tree(builder, child);
    }
}

/// The node on which the class of `node` is recorded.
fn class_target<B: TreeBuilder + ?Sized>(builder: &B, node: NodeId) -> NodeId {
    if builder.get_property(node, Property::TexClass).is_some() {
        node
    } else {
        builder.core_mo(node)
    }
}

fn set_class<B: TreeBuilder + ?Sized>(builder: &mut B, node: NodeId, class: TexClass) {
    let target = class_target(builder, node);
    builder.set_tex_class(target, class);
}

/// Binary operators that have nothing to operate on become ordinary.
fn adjust_row<B: TreeBuilder + ?Sized>(builder: &mut B, row: NodeId) {
    let children = builder.get_children(row).to_vec();
    let mut prev: Option<NodeId> = None;
    for (i, &child) in children.iter().enumerate() {
        let class = builder.tex_class(child);
        if class == TexClass::None {
            continue;
        }
        let prev_class = prev.map_or(TexClass::None, |prev| builder.tex_class(prev));
        if class == TexClass::Bin
            && matches!(
                prev_class,
                TexClass::None
                    | TexClass::Bin
                    | TexClass::Op
                    | TexClass::Rel
                    | TexClass::Open
                    | TexClass::Punct
            )
        {
            set_class(builder, child, TexClass::Ord);
        } else if prev_class == TexClass::Bin
            && matches!(class, TexClass::Rel | TexClass::Close | TexClass::Punct)
        {
            if let Some(prev) = prev {
                set_class(builder, prev, TexClass::Ord);
            }
        } else if class == TexClass::Bin && i + 1 == children.len() {
            set_class(builder, child, TexClass::Ord);
        }
        prev = Some(child);
    }
}

fn is_relation<B: TreeBuilder + ?Sized>(builder: &B, node: NodeId) -> bool {
    builder.is_kind(node, NodeKind::Mo)
        && matches!(
            builder.get_property(node, Property::TexClass),
            Some(PropValue::Class(TexClass::Rel))
        )
}

fn can_merge<B: TreeBuilder + ?Sized>(builder: &B, first: NodeId, second: NodeId) -> bool {
    let family = |node| builder.get_property(node, Property::RelFamily);
    matches!((family(first), family(second)), (Some(a), Some(b)) if a == b)
        && builder.attributes(first) == builder.attributes(second)
}

/// Merge runs of relations of the same family (`<<`, `:=`), and remove the space between
/// adjacent relations that stay apart.
fn combine_relations<B: TreeBuilder + ?Sized>(builder: &mut B, row: NodeId) {
    let children = builder.get_children(row).to_vec();
    let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
    for &child in &children {
        if let Some(&last) = kept.last()
            && is_relation(builder, last)
            && is_relation(builder, child)
            && can_merge(builder, last, child)
        {
            let text = builder.text(child).unwrap_or("").to_string();
            builder.append_text(last, &text);
            continue;
        }
        kept.push(child);
    }
    if kept.len() != children.len() {
        builder.set_children(row, &kept);
    }
    for pair in kept.windows(2) {
        if is_relation(builder, pair[0]) && is_relation(builder, pair[1]) {
            builder.set_attribute(pair[0], Attr::Rspace, "0");
            builder.set_attribute(pair[1], Attr::Lspace, "0");
        }
    }
}

#[cfg(test)]
mod tests {
    use math_tree::{Arena, dump};

    use super::*;

    fn mo(arena: &mut Arena, text: &str, class: TexClass) -> NodeId {
        let node = arena.create_node(NodeKind::Mo, &[], &[], Some(text));
        arena.set_tex_class(node, class);
        node
    }

    fn rel(arena: &mut Arena, text: &str, family: &str) -> NodeId {
        let node = mo(arena, text, TexClass::Rel);
        arena.set_property(node, Property::RelFamily, PropValue::from(family));
        node
    }

    fn mi(arena: &mut Arena, text: &str) -> NodeId {
        arena.create_node(NodeKind::Mi, &[], &[], Some(text))
    }

    #[test]
    fn same_family_relations_merge() {
        let mut arena = Arena::new();
        let a = mi(&mut arena, "a");
        let lt1 = rel(&mut arena, "<", "order");
        let lt2 = rel(&mut arena, "<", "order");
        let b = mi(&mut arena, "b");
        let row = arena.create_node(NodeKind::Mrow, &[a, lt1, lt2, b], &[], None);
        clean_tree(&mut arena, row);
        assert_eq!(dump(&arena, row), r#"mrow(mi"a" mo"<<" mi"b")"#);
    }

    #[test]
    fn different_families_lose_their_space() {
        let mut arena = Arena::new();
        let eq = rel(&mut arena, "=", "equality");
        let lt1 = rel(&mut arena, "<", "order");
        let lt2 = rel(&mut arena, "<", "order");
        let row = arena.create_node(NodeKind::Mrow, &[eq, lt1, lt2], &[], None);
        clean_tree(&mut arena, row);
        assert_eq!(
            dump(&arena, row),
            r#"mrow(mo{rspace=0}"=" mo{lspace=0}"<<")"#
        );
    }

    #[test]
    fn binary_operators_need_operands() {
        let mut arena = Arena::new();
        let plus = mo(&mut arena, "+", TexClass::Bin);
        let x = mi(&mut arena, "x");
        let eq = rel(&mut arena, "=", "equality");
        let minus = mo(&mut arena, "−", TexClass::Bin);
        let y = mi(&mut arena, "y");
        let times = mo(&mut arena, "×", TexClass::Bin);
        let row = arena.create_node(NodeKind::Mrow, &[plus, x, eq, minus, y, times], &[], None);
        clean_tree(&mut arena, row);
        assert_eq!(arena.tex_class(plus), TexClass::Ord);
        assert_eq!(arena.tex_class(minus), TexClass::Ord);
        assert_eq!(arena.tex_class(times), TexClass::Ord);

        let a = mi(&mut arena, "a");
        let plus = mo(&mut arena, "+", TexClass::Bin);
        let b = mi(&mut arena, "b");
        let row = arena.create_node(NodeKind::Mrow, &[a, plus, b], &[], None);
        clean_tree(&mut arena, row);
        assert_eq!(arena.tex_class(plus), TexClass::Bin);
    }

    #[test]
    fn binary_before_relation_becomes_ordinary() {
        let mut arena = Arena::new();
        let a = mi(&mut arena, "a");
        let plus = mo(&mut arena, "+", TexClass::Bin);
        let eq = rel(&mut arena, "=", "equality");
        let b = mi(&mut arena, "b");
        let row = arena.create_node(NodeKind::Mrow, &[a, plus, eq, b], &[], None);
        clean_tree(&mut arena, row);
        assert_eq!(arena.tex_class(plus), TexClass::Ord);
    }

    #[test]
    fn lone_script_operator_is_ordinary() {
        let mut arena = Arena::new();
        let x = mi(&mut arena, "x");
        let plus = mo(&mut arena, "+", TexClass::Bin);
        let sup = arena.create_node(NodeKind::Msup, &[x, plus], &[], None);
        let math = arena.create_node(NodeKind::Math, &[sup], &[], None);
        clean_tree(&mut arena, math);
        assert_eq!(arena.tex_class(plus), TexClass::Ord);
    }
}

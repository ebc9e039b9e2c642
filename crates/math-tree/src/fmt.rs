use std::fmt::Write;

use crate::arena::NodeId;
use crate::attribute::{PropValue, Property};
use crate::builder::TreeBuilder;
use crate::kind::NodeKind;

/// Render a subtree as a compact single line.
///
/// The format is `kind[CLASS]{attr=value,...}(child child ...)`, with `*` after the kind of an
/// inferred row and the text of token nodes in double quotes. The class is only shown for rows
/// and `TeXAtom`s, where it is not implied by the content.
///
/// ```
/// use texmath_tree_internal::{Arena, NodeKind, TreeBuilder, dump};
///
/// let mut arena = Arena::new();
/// let x = arena.create_node(NodeKind::Mi, &[], &[], Some("x"));
/// let math = arena.create_node(NodeKind::Math, &[x], &[], None);
/// assert_eq!(dump(&arena, math), r#"math(mrow*(mi"x"))"#);
/// ```
pub fn dump<B: TreeBuilder + ?Sized>(builder: &B, node: NodeId) -> String {
    let mut output = String::new();
    write_node(builder, node, &mut output);
    output
}

fn write_node<B: TreeBuilder + ?Sized>(builder: &B, node: NodeId, output: &mut String) {
    let kind = builder.kind(node);
    if kind == NodeKind::Text {
        write_quoted(builder.text(node).unwrap_or(""), output);
        return;
    }
    output.push_str(<&str>::from(kind));
    if builder.is_inferred(node) {
        output.push('*');
    }
    if matches!(kind, NodeKind::Mrow | NodeKind::TeXAtom)
        && let Some(PropValue::Class(class)) = builder.get_property(node, Property::TexClass)
    {
        output.push('[');
        output.push_str(<&str>::from(*class));
        output.push(']');
    }
    let attributes = builder.attributes(node);
    if !attributes.is_empty() {
        output.push('{');
        for (i, (attr, value)) in attributes.iter().enumerate() {
            if i > 0 {
                output.push(',');
            }
            let _ = write!(output, "{}={}", <&str>::from(*attr), value);
        }
        output.push('}');
    }
    if kind.is_token() {
        let mut text = String::new();
        for &leaf in builder.get_children(node) {
            text.push_str(builder.text(leaf).unwrap_or(""));
        }
        write_quoted(&text, output);
        return;
    }
    let children = builder.get_children(node);
    if !children.is_empty() {
        output.push('(');
        for (i, &child) in children.iter().enumerate() {
            if i > 0 {
                output.push(' ');
            }
            write_node(builder, child, output);
        }
        output.push(')');
    }
}

fn write_quoted(text: &str, output: &mut String) {
    output.push('"');
    for ch in text.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            _ => output.push(ch),
        }
    }
    output.push('"');
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::arena::Arena;
    use crate::attribute::{Attr, TexClass};

    #[test]
    fn dump_atom_with_class_and_attributes() {
        let mut arena = Arena::new();
        let open = arena.create_node(
            NodeKind::Mo,
            &[],
            &[(Attr::Fence, "true"), (Attr::Stretchy, "true")],
            Some("("),
        );
        let x = arena.create_node(NodeKind::Mi, &[], &[], Some("x"));
        let row = arena.create_node(NodeKind::Mrow, &[open, x], &[], None);
        arena.set_tex_class(row, TexClass::Inner);
        let atom = arena.create_node(NodeKind::TeXAtom, &[row], &[], None);
        arena.set_tex_class(atom, TexClass::Ord);
        assert_snapshot!(dump(&arena, atom), @r#"TeXAtom[ORD](mrow*(mrow[INNER](mo{fence=true,stretchy=true}"(" mi"x")))"#);
    }

    #[test]
    fn dump_escapes_quotes() {
        let mut arena = Arena::new();
        let text = arena.create_node(NodeKind::Mtext, &[], &[], Some(r#"a"b\"#));
        assert_eq!(dump(&arena, text), r#"mtext"a\"b\\""#);
    }

    #[test]
    fn dump_empty_space() {
        let mut arena = Arena::new();
        let space = arena.create_node(NodeKind::Mspace, &[], &[(Attr::Width, "1em")], None);
        assert_eq!(dump(&arena, space), "mspace{width=1em}");
    }
}

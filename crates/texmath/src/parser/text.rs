//! `\text{...}` and friends: literal text with embedded `$...$` math.

use math_tree::{Attr, MathVariant, NodeId, NodeKind, TexClass, TreeBuilder};

use super::Parser;
use crate::error::ParseResult;
use crate::token::Token;

const NBSP: char = '\u{A0}';

/// Spaces at the ends of a text run would be dropped by a renderer; keep them as no-break spaces.
fn protect_edges(text: &str) -> String {
    let trimmed = text.trim_start_matches(' ');
    let leading = text.len() - trimmed.len();
    let core = trimmed.trim_end_matches(' ');
    let trailing = trimmed.len() - core.len();
    let mut protected = String::with_capacity(text.len() + leading + trailing);
    protected.extend(std::iter::repeat_n(NBSP, leading));
    protected.push_str(core);
    protected.extend(std::iter::repeat_n(NBSP, trailing));
    protected
}

impl<B: TreeBuilder + ?Sized> Parser<'_, '_, B> {
    pub(super) fn text_mode(&mut self, name: &str, variant: Option<MathVariant>) -> ParseResult<NodeId> {
        let tokens = self.read_raw_arg(name)?;
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut i = 0;
        while let Some(&tok) = tokens.get(i) {
            i += 1;
            match *tok.token() {
                Token::Other('$') => {
                    let Some(end) = tokens[i..]
                        .iter()
                        .position(|tok| tok.token().is_other('$'))
                        .map(|offset| i + offset)
                    else {
                        text.push('$');
                        continue;
                    };
                    self.flush_text(&mut text, variant, &mut nodes);
                    let math = tokens[i..end].to_vec();
                    let content = self.parse_tokens_with(math, tokens[end].span(), |frame| {
                        frame.font = None;
                        frame.merge_letters = false;
                    })?;
                    let atom = self
                        .builder
                        .create_node(NodeKind::TeXAtom, &[content], &[], None);
                    self.builder.set_tex_class(atom, TexClass::Ord);
                    nodes.push(atom);
                    i = end + 1;
                }
                Token::Whitespace => text.push(' '),
                Token::Active('~') => text.push(NBSP),
                Token::Command(cmd) => match cmd {
                    "{" | "}" | "$" | "&" | "%" | "#" | "_" => text.push_str(cmd),
                    " " => text.push(' '),
                    _ => {
                        text.push('\\');
                        text.push_str(cmd);
                    }
                },
                Token::GroupBegin | Token::GroupEnd => {}
                Token::Param(n) => {
                    text.push('#');
                    text.push(char::from(b'0' + n));
                }
                other => {
                    if let Some(ch) = other.as_char() {
                        text.push(ch);
                    }
                }
            }
        }
        self.flush_text(&mut text, variant, &mut nodes);
        Ok(match nodes.as_slice() {
            [] => self.mtext("", variant),
            [single] => *single,
            _ => self.builder.create_node(NodeKind::Mrow, &nodes, &[], None),
        })
    }

    fn flush_text(&mut self, text: &mut String, variant: Option<MathVariant>, nodes: &mut Vec<NodeId>) {
        if text.is_empty() {
            return;
        }
        let node = self.mtext(&protect_edges(text), variant);
        nodes.push(node);
        text.clear();
    }

    fn mtext(&mut self, text: &str, variant: Option<MathVariant>) -> NodeId {
        match variant {
            Some(variant) => self.builder.create_node(
                NodeKind::Mtext,
                &[],
                &[(Attr::Mathvariant, <&str>::from(variant))],
                Some(text),
            ),
            None => self
                .builder
                .create_node(NodeKind::Mtext, &[], &[], Some(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::super::tests::tree;
    use super::*;

    #[test]
    fn plain_text() {
        assert_snapshot!(tree(r"\text{abc}"), @r#"math(mrow*(mtext"abc"))"#);
        assert_snapshot!(tree(r"\textbf{x}"), @r#"math(mrow*(mtext{mathvariant=bold}"x"))"#);
        assert_snapshot!(tree(r"\text{\{a\}\$}"), @r#"math(mrow*(mtext"{a}$"))"#);
        assert_snapshot!(tree(r"\text{}"), @r#"math(mrow*(mtext""))"#);
        assert_snapshot!(tree(r"\text{$x}"), @r#"math(mrow*(mtext"$x"))"#);
        assert_snapshot!(tree(r"\text"), @"5: MissingArgFor");
    }

    #[test]
    fn spaces_at_the_edges() {
        assert_eq!(
            tree(r"\text{ if }x"),
            "math(mrow*(mtext\"\u{a0}if\u{a0}\" mi\"x\"))"
        );
        assert_eq!(protect_edges("a b"), "a b");
        assert_eq!(protect_edges("  "), "\u{a0}\u{a0}");
    }

    #[test]
    fn math_inside_text() {
        assert_eq!(
            tree(r"\text{for $x^2$}"),
            "math(mrow*(mrow(mtext\"for\u{a0}\" TeXAtom[ORD](mrow*(msup(mi\"x\" mn\"2\"))))))"
        );
        assert_snapshot!(tree(r"\text{$\frac{a}$}"), @"16: MissingArgFor");
    }
}

#[cfg(feature = "serde")]
use serde::Serialize;

use strum_macros::IntoStaticStr;

/// The kind of a node in the math tree.
///
/// The names mirror MathML element names, plus two internal kinds: `TeXAtom`, which records an
/// explicit TeX class for its content, and `text`, the string leaf below token elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum NodeKind {
    #[strum(serialize = "math")]
    Math,
    #[strum(serialize = "mrow")]
    Mrow,
    #[strum(serialize = "mi")]
    Mi,
    #[strum(serialize = "mo")]
    Mo,
    #[strum(serialize = "mn")]
    Mn,
    #[strum(serialize = "mtext")]
    Mtext,
    #[strum(serialize = "mspace")]
    Mspace,
    #[strum(serialize = "msub")]
    Msub,
    #[strum(serialize = "msup")]
    Msup,
    #[strum(serialize = "msubsup")]
    Msubsup,
    #[strum(serialize = "munder")]
    Munder,
    #[strum(serialize = "mover")]
    Mover,
    #[strum(serialize = "munderover")]
    Munderover,
    #[strum(serialize = "mfrac")]
    Mfrac,
    #[strum(serialize = "msqrt")]
    Msqrt,
    #[strum(serialize = "mroot")]
    Mroot,
    #[strum(serialize = "mstyle")]
    Mstyle,
    #[strum(serialize = "merror")]
    Merror,
    #[strum(serialize = "mpadded")]
    Mpadded,
    #[strum(serialize = "mphantom")]
    Mphantom,
    #[strum(serialize = "menclose")]
    Menclose,
    #[strum(serialize = "mtable")]
    Mtable,
    #[strum(serialize = "mtr")]
    Mtr,
    #[strum(serialize = "mlabeledtr")]
    Mlabeledtr,
    #[strum(serialize = "mtd")]
    Mtd,
    #[strum(serialize = "TeXAtom")]
    TeXAtom,
    #[strum(serialize = "text")]
    Text,
}

/// How many children a node kind takes, and how inferred rows are treated when appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The `text` leaf, and `mspace`.
    Leaf,
    /// Token elements (`mi`, `mo`, ...), whose children are text leaves.
    Token,
    /// A fixed number of children; an appended inferred row becomes a plain `mrow`.
    Fixed(u8),
    /// Any number of children; an appended inferred row is spliced in.
    Unbounded,
    /// The node owns a single inferred `mrow`, and appended children go into that row.
    InferredRow,
}

impl NodeKind {
    pub const fn arity(&self) -> Arity {
        match self {
            NodeKind::Text | NodeKind::Mspace => Arity::Leaf,
            NodeKind::Mi | NodeKind::Mo | NodeKind::Mn | NodeKind::Mtext => Arity::Token,
            NodeKind::Msub
            | NodeKind::Msup
            | NodeKind::Munder
            | NodeKind::Mover
            | NodeKind::Mfrac
            | NodeKind::Mroot => Arity::Fixed(2),
            NodeKind::Msubsup | NodeKind::Munderover => Arity::Fixed(3),
            NodeKind::Mrow | NodeKind::Mtable | NodeKind::Mtr | NodeKind::Mlabeledtr => {
                Arity::Unbounded
            }
            NodeKind::Math
            | NodeKind::Msqrt
            | NodeKind::Mstyle
            | NodeKind::Merror
            | NodeKind::Mpadded
            | NodeKind::Mphantom
            | NodeKind::Menclose
            | NodeKind::Mtd
            | NodeKind::TeXAtom => Arity::InferredRow,
        }
    }

    #[inline]
    pub const fn is_token(&self) -> bool {
        matches!(self.arity(), Arity::Token)
    }

    /// Script-like nodes whose embellishment is decided by their base (first child).
    #[inline]
    pub const fn is_script_base(&self) -> bool {
        matches!(
            self,
            NodeKind::Msub
                | NodeKind::Msup
                | NodeKind::Msubsup
                | NodeKind::Munder
                | NodeKind::Mover
                | NodeKind::Munderover
                | NodeKind::Mfrac
        )
    }

    /// Layout nodes that are transparent for embellishment.
    #[inline]
    pub const fn is_layout(&self) -> bool {
        matches!(
            self,
            NodeKind::Mstyle | NodeKind::Mphantom | NodeKind::Mpadded | NodeKind::TeXAtom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_mathml() {
        assert_eq!(<&str>::from(NodeKind::Munderover), "munderover");
        assert_eq!(<&str>::from(NodeKind::TeXAtom), "TeXAtom");
    }

    #[test]
    fn arity() {
        assert_eq!(NodeKind::Mfrac.arity(), Arity::Fixed(2));
        assert_eq!(NodeKind::Msubsup.arity(), Arity::Fixed(3));
        assert_eq!(NodeKind::Mtd.arity(), Arity::InferredRow);
        assert!(NodeKind::Mo.is_token());
        assert!(!NodeKind::Mspace.is_token());
    }
}

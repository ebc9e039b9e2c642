//! The definition types that make up the symbol tables of packages.

use strum_macros::IntoStaticStr;

use math_tree::{Attr, Length, MathVariant, NodeKind, TexClass};

/// The meaning of a control sequence or character in a package.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Def {
    /// A symbol that becomes a single token node.
    Char(CharDef),
    /// A macro that is expanded textually.
    Macro(MacroDef),
    /// A primitive with a built-in handler.
    Prim(Prim),
    /// A symbol that is primarily meant as a `\left`/`\right` delimiter.
    Delim(CharDef),
    /// The command form of an environment, e.g. `\matrix{...}`.
    Env(EnvDef),
}

/// Which relations may be merged into a single operator when they are adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RelFamily {
    Order,
    Equality,
    Arrow,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CharDef {
    pub kind: NodeKind,
    pub text: &'static str,
    pub class: TexClass,
    pub attrs: &'static [(Attr, &'static str)],
    pub family: Option<RelFamily>,
    /// Scripts become limits (`munder`/`mover`).
    pub limits: bool,
}

impl CharDef {
    const fn new(kind: NodeKind, text: &'static str, class: TexClass) -> Self {
        CharDef {
            kind,
            text,
            class,
            attrs: &[],
            family: None,
            limits: false,
        }
    }

    pub(crate) const fn with_attrs(self, attrs: &'static [(Attr, &'static str)]) -> Self {
        CharDef { attrs, ..self }
    }

    pub(crate) const fn with_limits(self) -> Self {
        CharDef {
            limits: true,
            ..self
        }
    }

    pub(crate) const fn in_family(self, family: RelFamily) -> Self {
        CharDef {
            family: Some(family),
            ..self
        }
    }
}

/// An identifier.
pub(crate) const fn mi(text: &'static str) -> CharDef {
    CharDef::new(NodeKind::Mi, text, TexClass::Ord)
}

/// An upright identifier, e.g. capital Greek letters.
pub(crate) const fn mi_upright(text: &'static str) -> CharDef {
    mi(text).with_attrs(&[(Attr::Mathvariant, "normal")])
}

pub(crate) const fn mo(text: &'static str, class: TexClass) -> CharDef {
    CharDef::new(NodeKind::Mo, text, class)
}

/// A relation; relations default to the family of "other" relations.
pub(crate) const fn rel(text: &'static str, family: RelFamily) -> CharDef {
    mo(text, TexClass::Rel).in_family(family)
}

pub(crate) const fn bin(text: &'static str) -> CharDef {
    mo(text, TexClass::Bin)
}

/// A large operator such as `\sum`, with movable limits.
pub(crate) const fn big_op(text: &'static str) -> CharDef {
    mo(text, TexClass::Op)
        .with_attrs(&[(Attr::Movablelimits, "true")])
        .with_limits()
}

/// An integral-like large operator, with scripts on the side.
pub(crate) const fn int_op(text: &'static str) -> CharDef {
    mo(text, TexClass::Op)
}

pub(crate) const fn mn(text: &'static str) -> CharDef {
    CharDef::new(NodeKind::Mn, text, TexClass::Ord)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MacroDef {
    pub body: &'static str,
    pub params: u8,
}

pub(crate) const fn mac(body: &'static str, params: u8) -> Def {
    Def::Macro(MacroDef { body, params })
}

/// Display style and script level set by `\dfrac`, `\displaystyle` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MathStyle {
    Display,
    Text,
    Script,
    ScriptScript,
}

impl MathStyle {
    pub(crate) const fn attrs(self) -> [(Attr, &'static str); 2] {
        match self {
            MathStyle::Display => [(Attr::Displaystyle, "true"), (Attr::Scriptlevel, "0")],
            MathStyle::Text => [(Attr::Displaystyle, "false"), (Attr::Scriptlevel, "0")],
            MathStyle::Script => [(Attr::Displaystyle, "false"), (Attr::Scriptlevel, "1")],
            MathStyle::ScriptScript => [(Attr::Displaystyle, "false"), (Attr::Scriptlevel, "2")],
        }
    }

    /// The style selected by the fourth argument of `\genfrac`.
    pub(crate) fn from_genfrac(digit: char) -> Option<Self> {
        Some(match digit {
            '0' => MathStyle::Display,
            '1' => MathStyle::Text,
            '2' => MathStyle::Script,
            '3' => MathStyle::ScriptScript,
            _ => return None,
        })
    }
}

/// The `\over` family of primitives, which split the current group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverKind {
    Over,
    Atop,
    Above,
    Choose,
    Brace,
    Brack,
    OverWithDelims,
    AtopWithDelims,
    AboveWithDelims,
}

impl OverKind {
    /// Fixed delimiters around the fraction.
    pub(crate) const fn delims(self) -> Option<(&'static str, &'static str)> {
        match self {
            OverKind::Choose => Some(("(", ")")),
            OverKind::Brace => Some(("{", "}")),
            OverKind::Brack => Some(("[", "]")),
            _ => None,
        }
    }

    pub(crate) const fn reads_delims(self) -> bool {
        matches!(
            self,
            OverKind::OverWithDelims | OverKind::AtopWithDelims | OverKind::AboveWithDelims
        )
    }

    pub(crate) const fn reads_thickness(self) -> bool {
        matches!(self, OverKind::Above | OverKind::AboveWithDelims)
    }

    pub(crate) const fn has_no_rule(self) -> bool {
        matches!(
            self,
            OverKind::Atop
                | OverKind::Choose
                | OverKind::Brace
                | OverKind::Brack
                | OverKind::AtopWithDelims
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhantomKind {
    Both,
    Horizontal,
    Vertical,
}

/// The handler of a primitive control sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Prim {
    Begin,
    End,
    Left,
    Right,
    Middle,
    /// `\big` and friends: size in em and the class of the resulting atom.
    Big(&'static str, TexClass),
    Frac(Option<MathStyle>),
    CFrac,
    Binom(Option<MathStyle>),
    Genfrac,
    Over(OverKind),
    Sqrt,
    /// `\limits` (true) and `\nolimits` (false).
    Limits(bool),
    Font(MathVariant),
    FontSwitch(MathVariant),
    Style(MathStyle),
    Color,
    TextColor,
    ColorBox,
    DefineColor,
    /// `\mathop`, `\mathbin`, ...
    Class(TexClass),
    /// A fixed space.
    Space(Length),
    NonBreakingSpace,
    Hspace,
    /// `\kern`, `\hskip`; `\mkern`, `\mskip` (true) require `mu`.
    Kern(bool),
    Text(Option<MathVariant>),
    Not,
    Phantom(PhantomKind),
    Smash,
    Enclose(&'static str),
    CancelTo,
    Bbox,
    /// An accent over the argument; the flag marks stretchy accents.
    Accent(&'static str, bool),
    Decorate(Decoration),
    Overset,
    Underset,
    Stackrel,
    XArrow(&'static str),
    /// A named function like `\sin`.
    NamedFn(&'static str),
    /// A named operator with limits like `\lim`.
    NamedOp(&'static str),
    OperatorName,
    Cr,
    Hline,
    Tag,
    Notag,
    Label,
    /// `\ref` (false) and `\eqref` (true).
    Ref(bool),
    NewCommand,
    Def,
    Let,
}

/// Lines, braces and arrows drawn over or under an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoration {
    Overline,
    Underline,
    /// Braces take their scripts as limits.
    Overbrace,
    Underbrace,
    Overarrow(&'static str),
    Underarrow(&'static str),
}

impl Decoration {
    pub(crate) const fn is_over(self) -> bool {
        matches!(
            self,
            Decoration::Overline | Decoration::Overbrace | Decoration::Overarrow(_)
        )
    }

    pub(crate) const fn text(self) -> &'static str {
        match self {
            Decoration::Overline | Decoration::Underline => "\u{2015}",
            Decoration::Overbrace => "\u{23DE}",
            Decoration::Underbrace => "\u{23DF}",
            Decoration::Overarrow(arrow) | Decoration::Underarrow(arrow) => arrow,
        }
    }
}

/// The layout of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnvKind {
    /// `array`: column specification from an argument.
    Array,
    /// Matrices with optional fences.
    Matrix(&'static str, &'static str),
    SmallMatrix,
    Cases,
    Aligned,
    Gathered,
    Split,
    Align,
    Gather,
    Multline,
    Equation,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct EnvDef {
    pub kind: EnvKind,
    /// Rows are numbered automatically (unstarred display environments).
    pub numbered: bool,
}

impl EnvDef {
    pub(crate) const fn new(kind: EnvKind) -> Self {
        EnvDef {
            kind,
            numbered: false,
        }
    }

    pub(crate) const fn numbered(kind: EnvKind) -> Self {
        EnvDef {
            kind,
            numbered: true,
        }
    }

    /// Display-level environments that carry equation numbers and may not be nested.
    pub(crate) const fn is_display(&self) -> bool {
        matches!(
            self.kind,
            EnvKind::Align | EnvKind::Gather | EnvKind::Multline | EnvKind::Equation
        )
    }

    /// Whether `&` and `\\` are allowed.
    pub(crate) const fn is_table(&self) -> bool {
        !matches!(self.kind, EnvKind::Equation)
    }
}
